//! Template loading from the filesystem.
//! A template file is either compiled once and cached, or re-read and
//! recompiled on every access for development workflows.

use crate::error::{Error, Result};
use crate::processor::Processor;
use crate::template::CompiledTemplate;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// When a [`TemplateFile`] goes back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPolicy {
    /// Compile on first access and reuse the result
    #[default]
    Cached,
    /// Re-read and recompile on every access
    Always,
}

/// Reads and compiles a template file.
///
/// # Errors
/// * `Error::IoError` if the file cannot be read
/// * any compilation error of [`Processor::compile_str`]
pub fn load_template<P: AsRef<Path>>(path: P, processor: &Processor) -> Result<CompiledTemplate> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::ConfigError(format!(
            "template path '{}' is not a file",
            path.display()
        )));
    }
    debug!("Loading template from {}", path.display());
    let source = fs::read_to_string(path)?;
    processor.compile_str(&source)
}

/// A template file with its compiled form.
#[derive(Debug)]
pub struct TemplateFile {
    path: PathBuf,
    policy: ReloadPolicy,
    compiled: Option<CompiledTemplate>,
}

impl TemplateFile {
    pub fn new<P: Into<PathBuf>>(path: P, policy: ReloadPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            compiled: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last successful compilation, if any.
    pub fn compiled(&self) -> Option<&CompiledTemplate> {
        self.compiled.as_ref()
    }

    /// Returns the compiled template, compiling it when the policy requires.
    ///
    /// A failed recompilation leaves the previous result in place.
    pub fn get(&mut self, processor: &Processor) -> Result<&CompiledTemplate> {
        let stale = match self.policy {
            ReloadPolicy::Cached => self.compiled.is_none(),
            ReloadPolicy::Always => true,
        };
        if stale {
            let compiled = load_template(&self.path, processor)?;
            self.compiled = Some(compiled);
        }
        self.compiled.as_ref().ok_or_else(|| {
            Error::ConfigError(format!(
                "template '{}' was not compiled",
                self.path.display()
            ))
        })
    }
}
