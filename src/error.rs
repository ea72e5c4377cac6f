//! Error handling for the pre-conversion pipeline.
//! Defines the error type and result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// Errors raised while compiling or rendering a template.
///
/// Every variant except `Render` is a compile-time failure: it aborts the
/// compilation and no `CompiledTemplate` is produced.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// The external transformation tool failed, crashed, or produced
    /// empty or undecodable output.
    #[error("External tool error: `{command}` failed: {diagnostic}")]
    ExternalToolError { command: String, diagnostic: String },

    /// The transformed text no longer carries a placeholder exactly once.
    #[error(
        "Placeholder mismatch: `{placeholder}` {reason}; transformed text: {snippet}"
    )]
    PlaceholderMismatchError {
        placeholder: String,
        reason: String,
        snippet: String,
    },

    /// Malformed template syntax
    #[error("Parse error at {line}:{column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Runtime bindings could not be read.
    #[error("Context error: {0}")]
    ContextError(String),

    /// A compiled template could not be rendered with the given bindings.
    #[error("Render error: {0}")]
    RenderError(String),

    /// Invalid template discovery pattern.
    #[error("Pattern error: {0}")]
    PatternError(String),

    #[error("Output path '{output_dir}' already exists. Use --force to overwrite it")]
    OutputExistsError { output_dir: String },

    /// Some templates of a directory failed to compile.
    #[error("{failed} of {total} templates failed to compile")]
    BatchError { failed: usize, total: usize },
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
