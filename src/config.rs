//! Pre-conversion configuration.
//! Describes how the external transformation tool is invoked, which regions of
//! the script are protected from interpolation, and how the synthetic wrapper
//! around interpolation sites is spelled.

use crate::constants::{CONFIG_FILES, DEFAULT_PLACEHOLDER_PREFIX};
use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The external command that transforms script text from stdin to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl TransformCommand {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for TransformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Regions of script text that never hold interpolation sites or split points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapeRules {
    /// Delimiters that open and close a protected region, e.g. quotes.
    #[serde(default)]
    pub ignore_balanced: Vec<char>,
    /// Prefixes that protect the rest of their line, e.g. comment markers.
    #[serde(default)]
    pub ignore_line: Vec<String>,
}

/// Spelling of the synthetic wrapper that declares placeholders as parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapInsertion {
    #[serde(default)]
    pub indent: Option<String>,
    pub start_begin: String,
    pub separator: String,
    pub start_close: String,
    pub end: String,
    #[serde(default)]
    pub add_parens: bool,
}

fn default_placeholder_prefix() -> String {
    DEFAULT_PLACEHOLDER_PREFIX.to_string()
}

/// Everything the pipeline needs to pre-convert one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreConversionSpec {
    pub command: TransformCommand,
    #[serde(default)]
    pub escape: EscapeRules,
    #[serde(default)]
    pub wrap: Option<WrapInsertion>,
    #[serde(default = "default_placeholder_prefix")]
    pub placeholder_prefix: String,
}

impl PreConversionSpec {
    /// A spec with no wrapper and no escape rules.
    pub fn new(command: TransformCommand) -> Self {
        Self {
            command,
            escape: EscapeRules::default(),
            wrap: None,
            placeholder_prefix: default_placeholder_prefix(),
        }
    }

    pub fn with_wrap(mut self, wrap: WrapInsertion) -> Self {
        self.wrap = Some(wrap);
        self
    }

    pub fn with_escape(mut self, escape: EscapeRules) -> Self {
        self.escape = escape;
        self
    }

    /// CoffeeScript compiled in bare mode from stdin.
    pub fn coffeescript() -> Self {
        Self::new(TransformCommand::new("coffee").with_args(["-spb"]))
            .with_escape(EscapeRules {
                ignore_balanced: vec!['\'', '"'],
                ignore_line: vec!["#".to_string()],
            })
            .with_wrap(WrapInsertion {
                indent: Some("  ".to_string()),
                start_begin: "(".to_string(),
                separator: ", ".to_string(),
                start_close: ") ->".to_string(),
                end: String::new(),
                add_parens: true,
            })
    }

    /// TypeScript stripped to JavaScript with default settings.
    pub fn typescript() -> Self {
        Self::new(TransformCommand::new("esbuild").with_args(["--loader=ts"]))
            .with_escape(script_escape_rules())
            .with_wrap(function_wrap())
    }

    /// TypeScript with JSX elements and CommonJS module output.
    pub fn typescript_jsx() -> Self {
        Self::new(TransformCommand::new("esbuild").with_args([
            "--loader=tsx",
            "--format=cjs",
            "--jsx=transform",
        ]))
        .with_escape(script_escape_rules())
        .with_wrap(function_wrap())
    }

    /// Checks the invariants the pipeline relies on.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the program is empty or the placeholder
    ///   prefix is not a valid identifier start.
    pub fn validate(&self) -> Result<()> {
        if self.command.program.trim().is_empty() {
            return Err(Error::ConfigError("transform program must not be empty".to_string()));
        }
        let mut chars = self.placeholder_prefix.chars();
        let valid_start = chars
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            .unwrap_or(false);
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return Err(Error::ConfigError(format!(
                "placeholder prefix '{}' is not a valid identifier",
                self.placeholder_prefix
            )));
        }
        Ok(())
    }
}

fn script_escape_rules() -> EscapeRules {
    EscapeRules {
        ignore_balanced: vec!['\'', '"', '`'],
        ignore_line: vec!["//".to_string()],
    }
}

fn function_wrap() -> WrapInsertion {
    WrapInsertion {
        indent: None,
        start_begin: ";(function(".to_string(),
        separator: ", ".to_string(),
        start_close: "){".to_string(),
        end: "})".to_string(),
        add_parens: false,
    }
}

/// Finds the first configuration file present in a directory.
///
/// # Arguments
/// * `dir` - Directory to search
/// * `config_files` - Candidate file names, tried in order
///
/// # Errors
/// * `Error::ConfigError` if none of the files exist
pub fn find_config<P: AsRef<Path>>(dir: P, config_files: &[&str]) -> Result<PathBuf> {
    for file in config_files {
        let config_path = dir.as_ref().join(file);
        if config_path.exists() {
            debug!("Found configuration at {}", config_path.display());
            return Ok(config_path);
        }
    }

    Err(Error::ConfigError(format!(
        "No configuration file found (tried: {})",
        config_files.join(", ")
    )))
}

/// Parses a spec from JSON, falling back to YAML.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither, or fails validation
pub fn parse_config(content: &str) -> Result<PreConversionSpec> {
    let spec: PreConversionSpec = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}")))?,
    };
    spec.validate()?;
    Ok(spec)
}

/// Loads a spec from a file, or from the first of [`CONFIG_FILES`] when
/// `path` is a directory.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PreConversionSpec> {
    let path = path.as_ref();
    let config_path = if path.is_dir() {
        find_config(path, &CONFIG_FILES)?
    } else {
        path.to_path_buf()
    };
    debug!("Loading configuration from {}", config_path.display());
    let content = std::fs::read_to_string(&config_path)?;
    parse_config(&content)
}

/// Parses render bindings from JSON, falling back to YAML. Blank input
/// yields an empty object.
///
/// # Errors
/// * `Error::ContextError` if the content is neither
pub fn parse_bindings(content: &str) -> Result<serde_json::Value> {
    if content.trim().is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    match serde_json::from_str(content) {
        Ok(v) => Ok(v),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ContextError(format!("Invalid bindings format: {e}"))),
    }
}

/// Reads render bindings from a JSON or YAML file.
pub fn load_bindings<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_bindings(&content)
}
