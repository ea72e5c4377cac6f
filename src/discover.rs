//! Template discovery.
//! Collects the template files under a directory that match a set of glob
//! patterns, and maps each one to its output path.

use crate::constants::TEMPLATE_EXTENSION;
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Compiles glob patterns into a set.
///
/// # Errors
/// * `Error::PatternError` for an invalid pattern
pub fn build_globset<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern.as_ref()).map_err(|e| {
            Error::PatternError(format!("invalid pattern '{}': {}", pattern.as_ref(), e))
        })?);
    }
    builder.build().map_err(|e| Error::PatternError(e.to_string()))
}

/// Lists files under `root` whose path relative to `root` matches `globs`,
/// sorted by path.
pub fn find_templates<P: AsRef<Path>>(root: P, globs: &GlobSet) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if globs.is_match(relative) {
            debug!("Found template {}", relative.display());
            found.push(entry.path().to_path_buf());
        } else {
            debug!("Skipping {}", relative.display());
        }
    }
    Ok(found)
}

/// Output location of a template: its path relative to `template_root`
/// placed under `output_root`, with a trailing `.tmpl` extension removed.
pub fn resolve_target_path<P: AsRef<Path>>(
    template: P,
    template_root: P,
    output_root: P,
) -> PathBuf {
    let template = template.as_ref();
    let relative = template.strip_prefix(template_root.as_ref()).unwrap_or(template);
    let target = output_root.as_ref().join(relative);
    if target.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION) {
        target.with_extension("")
    } else {
        target
    }
}
