//! Compile-time pre-conversion of interpolated script templates.
//! A template's literal script is run once through an external compiler with
//! its interpolation sites held as placeholder identifiers; the result is a
//! reusable template that is rendered many times with runtime bindings.

/// Command-line interface module
pub mod cli;

/// Placeholder re-substitution and code generation
pub mod codegen;

/// Pre-conversion configuration (JSON or YAML) and presets
pub mod config;

/// Common constants
pub mod constants;

/// Template discovery inside a directory
pub mod discover;

/// Error types and handling
pub mod error;

/// Protected regions: quoted strings and line comments
pub mod escape;

/// Interpolation site extraction
pub mod extract;

/// Template file loading with cached or always-reload policies
pub mod loader;

/// Logger initialization for the binary
pub mod logger;

/// Template text parsing
pub mod parser;

/// Placeholder token generation and lookup
pub mod placeholder;

/// Pipeline orchestration
pub mod processor;

/// Rendering of compiled templates with runtime bindings
pub mod renderer;

/// External process invocation
pub mod runner;

/// Template node types
pub mod template;

/// Wrap-and-transform engine
pub mod transform;
