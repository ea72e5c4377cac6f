//! Common constants used throughout the crate.

/// Supported pre-conversion configuration file names
pub const CONFIG_FILES: [&str; 3] = ["preconvert.json", "preconvert.yml", "preconvert.yaml"];

/// Prefix of generated placeholder identifiers
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "shakespeare_var_";

/// Extension stripped from template files when writing their output
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// Glob used to discover templates when none is given
pub const DEFAULT_TEMPLATE_GLOB: &str = "**/*.tmpl";

/// Number of characters of transformed text quoted in mismatch errors
pub const SNIPPET_LEN: usize = 120;
