//! Pre-conversion pipeline orchestration.
//! Runs a template through extraction, wrap-and-transform and re-substitution.

use log::debug;

use crate::codegen::generate;
use crate::config::PreConversionSpec;
use crate::error::Result;
use crate::extract::extract;
use crate::parser::parse_template_with;
use crate::runner::{ProcessRunner, SubprocessRunner};
use crate::template::{CompiledTemplate, TemplateNode};
use crate::transform::transform;

/// Compiles templates with one spec and one process runner.
pub struct Processor<'a> {
    spec: &'a PreConversionSpec,
    runner: &'a dyn ProcessRunner,
}

impl<'a> Processor<'a> {
    pub fn new(spec: &'a PreConversionSpec, runner: &'a dyn ProcessRunner) -> Self {
        Self { spec, runner }
    }

    /// Parses and compiles template source text.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the spec fails validation
    /// * `Error::ParseError` for malformed markers
    /// * `Error::ExternalToolError` if the transform command fails
    /// * `Error::PlaceholderMismatchError` if the tool mangled a placeholder
    pub fn compile_str(&self, source: &str) -> Result<CompiledTemplate> {
        let nodes = parse_template_with(source, &self.spec.escape)?;
        self.compile_nodes(nodes)
    }

    /// Compiles an already parsed node sequence.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the spec fails validation
    pub fn compile_nodes(&self, nodes: Vec<TemplateNode>) -> Result<CompiledTemplate> {
        self.spec.validate()?;
        let extraction = extract(nodes, &self.spec.escape);
        let transformed = transform(&extraction, self.spec, self.runner)?;
        let compiled = generate(transformed, &extraction.interpolations, self.spec)?;
        debug!("Compiled template with {} interpolations", extraction.interpolations.len());
        Ok(compiled)
    }
}

/// Compiles template source with the spec's command run as a subprocess.
pub fn compile(source: &str, spec: &PreConversionSpec) -> Result<CompiledTemplate> {
    let runner = SubprocessRunner::new();
    Processor::new(spec, &runner).compile_str(source)
}
