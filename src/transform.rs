//! Wrap-and-transform engine.
//! Rewrites every interpolation site as a placeholder identifier so the whole
//! template is valid script, optionally declares those identifiers as the
//! parameters of a synthetic wrapper, and runs the result through the
//! external tool.

use log::{debug, info};

use crate::config::{PreConversionSpec, WrapInsertion};
use crate::error::Result;
use crate::extract::Extraction;
use crate::placeholder::{generate_placeholders, PlaceholderToken};
use crate::runner::ProcessRunner;
use crate::template::TemplateNode;

/// How the placeholders were laid out in the text sent to the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// No interpolation sites; the literal text was sent unchanged.
    Direct,
    /// Placeholders are parameters of the synthetic wrapper.
    Wrapped,
    /// Placeholders are written inline with no wrapper.
    Inline,
}

/// Script text ready for the external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSource {
    pub blob: String,
    pub placeholders: Vec<PlaceholderToken>,
    pub mode: WrapMode,
}

/// The tool's output together with what is needed to undo the wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    pub placeholders: Vec<PlaceholderToken>,
    pub mode: WrapMode,
}

fn indent_lines(body: &str, indent: &str) -> String {
    body.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect()
}

fn write_body(extraction: &Extraction, placeholders: &[PlaceholderToken]) -> String {
    let mut tokens = placeholders.iter();
    let mut body = String::new();
    for node in &extraction.nodes {
        match node {
            TemplateNode::Literal(text) => body.push_str(text),
            TemplateNode::Interpolation(_) => {
                if let Some(token) = tokens.next() {
                    body.push_str(token.as_str());
                }
            }
        }
    }
    body
}

fn wrap(body: &str, placeholders: &[PlaceholderToken], wrap: &WrapInsertion) -> String {
    let params: Vec<&str> = placeholders.iter().map(PlaceholderToken::as_str).collect();
    let body = match &wrap.indent {
        Some(indent) => indent_lines(body, indent),
        None => body.to_string(),
    };

    let mut blob = String::with_capacity(body.len() + 64);
    blob.push_str(&wrap.start_begin);
    blob.push_str(&params.join(&wrap.separator));
    blob.push_str(&wrap.start_close);
    blob.push('\n');
    blob.push_str(&body);
    if !body.ends_with('\n') {
        blob.push('\n');
    }
    blob.push_str(&wrap.end);
    blob
}

/// Builds the text handed to the external tool.
pub fn prepare_source(extraction: &Extraction, spec: &PreConversionSpec) -> PreparedSource {
    if !extraction.has_interpolations() {
        return PreparedSource {
            blob: extraction.literal_text(),
            placeholders: Vec::new(),
            mode: WrapMode::Direct,
        };
    }

    let placeholders = generate_placeholders(
        extraction.interpolations.iter().map(|i| &i.expr),
        &extraction.literal_text(),
        &spec.placeholder_prefix,
    );
    let body = write_body(extraction, &placeholders);

    match &spec.wrap {
        Some(wrap_insertion) => PreparedSource {
            blob: wrap(&body, &placeholders, wrap_insertion),
            placeholders,
            mode: WrapMode::Wrapped,
        },
        None => PreparedSource {
            blob: body,
            placeholders,
            mode: WrapMode::Inline,
        },
    }
}

/// Prepares the source and runs it through the spec's transform command.
///
/// # Errors
/// * `Error::ExternalToolError` from the runner
pub fn transform(
    extraction: &Extraction,
    spec: &PreConversionSpec,
    runner: &dyn ProcessRunner,
) -> Result<Transformed> {
    let prepared = prepare_source(extraction, spec);
    debug!(
        "Prepared {:?} source with {} placeholders",
        prepared.mode,
        prepared.placeholders.len()
    );

    let text = runner.run(&spec.command, &prepared.blob)?;
    info!("Transformed template with `{}`", spec.command);

    Ok(Transformed {
        text,
        placeholders: prepared.placeholders,
        mode: prepared.mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EscapeRules, TransformCommand};
    use crate::extract::extract;
    use crate::parser::parse_template;

    fn prepared(source: &str, spec: &PreConversionSpec) -> PreparedSource {
        let nodes = parse_template(source).unwrap();
        prepare_source(&extract(nodes, &spec.escape), spec)
    }

    #[test]
    fn test_direct_mode_sends_literal_text() {
        let spec = PreConversionSpec::typescript();
        let source = prepared("var b: number = 1;\n", &spec);
        assert_eq!(source.mode, WrapMode::Direct);
        assert_eq!(source.blob, "var b: number = 1;\n");
        assert!(source.placeholders.is_empty());
    }

    #[test]
    fn test_function_wrapper() {
        let spec = PreConversionSpec::typescript();
        let source = prepared("var b = 1\nconsole.log(#{a} + b)", &spec);
        assert_eq!(source.mode, WrapMode::Wrapped);
        assert_eq!(
            source.blob,
            ";(function(shakespeare_var_a){\nvar b = 1\nconsole.log(shakespeare_var_a + b)\n})"
        );
    }

    #[test]
    fn test_wrapper_with_many_params() {
        let spec = PreConversionSpec::typescript();
        let source = prepared("f(#{a}, @{home}, #{a});\n", &spec);
        assert_eq!(
            source.blob,
            ";(function(shakespeare_var_a, shakespeare_var_home, shakespeare_var_a_1){\n\
             f(shakespeare_var_a, shakespeare_var_home, shakespeare_var_a_1);\n})"
        );
    }

    #[test]
    fn test_indented_wrapper() {
        let spec = PreConversionSpec::coffeescript();
        let source = prepared("x = #{a}\n\ny = 2\n", &spec);
        assert_eq!(source.blob, "(shakespeare_var_a) ->\n  x = shakespeare_var_a\n\n  y = 2\n");
    }

    #[test]
    fn test_inline_mode_without_wrapper() {
        let spec = PreConversionSpec::new(TransformCommand::new("cat"));
        let source = prepared("x = #{a};", &spec);
        assert_eq!(source.mode, WrapMode::Inline);
        assert_eq!(source.blob, "x = shakespeare_var_a;");
    }

    #[test]
    fn test_protected_marker_stays_literal() {
        let spec = PreConversionSpec::new(TransformCommand::new("cat")).with_escape(EscapeRules {
            ignore_balanced: vec!['"'],
            ignore_line: vec![],
        });
        let nodes = vec![
            TemplateNode::literal("s = \""),
            TemplateNode::plain("a").unwrap(),
            TemplateNode::literal("\";"),
        ];
        let source = prepare_source(&extract(nodes, &spec.escape), &spec);
        assert_eq!(source.mode, WrapMode::Direct);
        assert_eq!(source.blob, "s = \"#{a}\";");
    }
}
