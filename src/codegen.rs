//! Placeholder re-substitution and code generation.
//! Finds the placeholders again in the tool's output and rebuilds a node
//! sequence in which the original interpolations are live again.

use log::debug;

use crate::config::PreConversionSpec;
use crate::constants::SNIPPET_LEN;
use crate::error::{Error, Result};
use crate::escape::ProtectedRegions;
use crate::placeholder::{find_occurrences, PlaceholderToken};
use crate::template::{push_node, CompileMetadata, CompiledTemplate, Interpolation, TemplateNode};
use crate::transform::{Transformed, WrapMode};

fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_LEN) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

fn mismatch(token: &PlaceholderToken, reason: impl Into<String>, text: &str) -> Error {
    Error::PlaceholderMismatchError {
        placeholder: token.to_string(),
        reason: reason.into(),
        snippet: snippet(text),
    }
}

/// Locates each token, in declared order, at its first unprotected
/// occurrence after the previous token.
fn locate_in_order(
    text: &str,
    tokens: &[PlaceholderToken],
    regions: &ProtectedRegions,
) -> Result<Vec<(usize, Vec<usize>)>> {
    let mut cursor = 0;
    let mut located = Vec::with_capacity(tokens.len());
    for token in tokens {
        let occurrences = find_occurrences(text, token, regions);
        if occurrences.is_empty() {
            return Err(mismatch(token, "is missing from the transformed text", text));
        }
        let pos = occurrences.iter().copied().find(|&p| p >= cursor).ok_or_else(|| {
            mismatch(token, "appears out of order in the transformed text", text)
        })?;
        cursor = pos + token.as_str().len();
        located.push((pos, occurrences));
    }
    Ok(located)
}

/// Wrapper kept: the tool's output is invoked with the interpolated values as
/// call arguments.
fn generate_wrapped(
    transformed: &Transformed,
    interpolations: &[Interpolation],
    add_parens: bool,
    regions: &ProtectedRegions,
) -> Result<Vec<TemplateNode>> {
    let text = transformed.text.as_str();
    let tokens = &transformed.placeholders;
    let located = locate_in_order(text, tokens, regions)?;

    // The parameter header spans from the first located token to the last.
    if let (Some((start, _)), Some((last, _)), Some(last_token)) =
        (located.first(), located.last(), tokens.last())
    {
        let end = last + last_token.as_str().len();
        for (token, (_, occurrences)) in tokens.iter().zip(&located) {
            let count = occurrences.iter().filter(|&&p| p >= *start && p < end).count();
            if count != 1 {
                return Err(mismatch(
                    token,
                    format!("appears {count} times in the wrapper parameters, expected once"),
                    text,
                ));
            }
            if !occurrences.iter().any(|&p| p >= end) {
                return Err(mismatch(token, "is not referenced in the wrapper body", text));
            }
        }
    }

    let trimmed = text.trim_end();
    let callee = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();

    let mut nodes = Vec::with_capacity(interpolations.len() * 2 + 3);
    push_node(&mut nodes, TemplateNode::literal(callee));
    push_node(&mut nodes, TemplateNode::literal("("));
    for (i, interpolation) in interpolations.iter().enumerate() {
        if i > 0 {
            push_node(&mut nodes, TemplateNode::literal(", "));
        }
        if add_parens {
            push_node(&mut nodes, TemplateNode::literal("("));
        }
        nodes.push(TemplateNode::Interpolation(interpolation.clone()));
        if add_parens {
            push_node(&mut nodes, TemplateNode::literal(")"));
        }
    }
    push_node(&mut nodes, TemplateNode::literal(");"));
    if text.ends_with('\n') {
        push_node(&mut nodes, TemplateNode::literal("\n"));
    }
    Ok(nodes)
}

/// No wrapper: split the output at each token and put the interpolation back
/// in its place.
fn generate_inline(
    transformed: &Transformed,
    interpolations: &[Interpolation],
    regions: &ProtectedRegions,
) -> Result<Vec<TemplateNode>> {
    let text = transformed.text.as_str();
    let tokens = &transformed.placeholders;
    let located = locate_in_order(text, tokens, regions)?;

    for (token, (_, occurrences)) in tokens.iter().zip(&located) {
        if occurrences.len() != 1 {
            return Err(mismatch(
                token,
                format!("appears {} times, expected once", occurrences.len()),
                text,
            ));
        }
    }

    let mut nodes = Vec::with_capacity(interpolations.len() * 2 + 1);
    let mut cursor = 0;
    for ((token, (pos, _)), interpolation) in tokens.iter().zip(&located).zip(interpolations) {
        push_node(&mut nodes, TemplateNode::literal(&text[cursor..*pos]));
        nodes.push(TemplateNode::Interpolation(interpolation.clone()));
        cursor = pos + token.as_str().len();
    }
    push_node(&mut nodes, TemplateNode::literal(&text[cursor..]));
    Ok(nodes)
}

/// Builds the compiled template from the tool's output and the original
/// interpolations (one per placeholder, same order).
///
/// # Errors
/// * `Error::PlaceholderMismatchError` if a placeholder was dropped,
///   duplicated or reordered by the tool
pub fn generate(
    transformed: Transformed,
    interpolations: &[Interpolation],
    spec: &PreConversionSpec,
) -> Result<CompiledTemplate> {
    let add_parens = spec.wrap.as_ref().is_some_and(|w| w.add_parens);
    let regions = ProtectedRegions::scan(&transformed.text, &spec.escape);

    let nodes = match transformed.mode {
        WrapMode::Direct => vec![TemplateNode::Literal(transformed.text.clone())],
        WrapMode::Wrapped => generate_wrapped(&transformed, interpolations, add_parens, &regions)?,
        WrapMode::Inline => generate_inline(&transformed, interpolations, &regions)?,
    };

    let metadata = CompileMetadata {
        placeholders: transformed.placeholders.iter().map(ToString::to_string).collect(),
        wrapped: transformed.mode == WrapMode::Wrapped,
        parenthesized_args: transformed.mode == WrapMode::Wrapped && add_parens,
    };
    debug!("Generated {} nodes ({:?})", nodes.len(), transformed.mode);
    Ok(CompiledTemplate::new(nodes, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformCommand;
    use crate::template::{InterpolationKind, SourceExpr};

    fn interp(expr: &str) -> Interpolation {
        Interpolation::new(SourceExpr::parse(expr).unwrap(), InterpolationKind::Plain)
    }

    fn token(name: &str) -> PlaceholderToken {
        crate::placeholder::generate_placeholders(&[SourceExpr::parse(name).unwrap()], "", "")
            .remove(0)
    }

    fn transformed(text: &str, names: &[&str], mode: WrapMode) -> Transformed {
        Transformed {
            text: text.to_string(),
            placeholders: names.iter().map(|n| token(n)).collect(),
            mode,
        }
    }

    #[test]
    fn test_direct_output_is_verbatim() {
        let spec = PreConversionSpec::typescript();
        let compiled =
            generate(transformed("var b = 1;\n", &[], WrapMode::Direct), &[], &spec).unwrap();
        assert_eq!(compiled.nodes(), &[TemplateNode::literal("var b = 1;\n")]);
        assert!(!compiled.metadata().wrapped);
    }

    #[test]
    fn test_wrapped_output_becomes_call() {
        let spec = PreConversionSpec::typescript();
        let text = "(function(a, b) {\n  f(a, b);\n});\n";
        let compiled = generate(
            transformed(text, &["a", "b"], WrapMode::Wrapped),
            &[interp("x"), interp("y")],
            &spec,
        )
        .unwrap();
        assert_eq!(
            compiled.nodes(),
            &[
                TemplateNode::literal("(function(a, b) {\n  f(a, b);\n})("),
                TemplateNode::Interpolation(interp("x")),
                TemplateNode::literal(", "),
                TemplateNode::Interpolation(interp("y")),
                TemplateNode::literal(");\n"),
            ]
        );
        assert_eq!(compiled.metadata().placeholders, ["a", "b"]);
        assert!(compiled.metadata().wrapped);
    }

    #[test]
    fn test_parenthesized_arguments() {
        let spec = PreConversionSpec::coffeescript();
        let text = "(function(a) {\n  return a;\n});\n";
        let compiled =
            generate(transformed(text, &["a"], WrapMode::Wrapped), &[interp("x")], &spec).unwrap();
        assert_eq!(
            compiled.nodes(),
            &[
                TemplateNode::literal("(function(a) {\n  return a;\n})(("),
                TemplateNode::Interpolation(interp("x")),
                TemplateNode::literal("));\n"),
            ]
        );
        assert!(compiled.metadata().parenthesized_args);
    }

    #[test]
    fn test_dropped_parameter_is_mismatch() {
        let spec = PreConversionSpec::typescript();
        let text = "(function(a) {\n  f(a);\n});";
        let err = generate(
            transformed(text, &["a", "b"], WrapMode::Wrapped),
            &[interp("x"), interp("y")],
            &spec,
        )
        .unwrap_err();
        match err {
            Error::PlaceholderMismatchError { placeholder, .. } => assert_eq!(placeholder, "b"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reordered_parameters_are_mismatch() {
        let spec = PreConversionSpec::typescript();
        let text = "(function(b, a) {\n  f(a, b);\n});";
        let err = generate(
            transformed(text, &["a", "b"], WrapMode::Wrapped),
            &[interp("x"), interp("y")],
            &spec,
        )
        .unwrap_err();
        assert!(matches!(err, Error::PlaceholderMismatchError { .. }));
    }

    #[test]
    fn test_inline_split() {
        let spec = PreConversionSpec::new(TransformCommand::new("cat"));
        let text = "x = a + \"a\" + b;\n";
        let mut spec_with_quotes = spec.clone();
        spec_with_quotes.escape.ignore_balanced = vec!['"'];
        let compiled = generate(
            transformed(text, &["a", "b"], WrapMode::Inline),
            &[interp("first"), interp("second")],
            &spec_with_quotes,
        )
        .unwrap();
        assert_eq!(
            compiled.nodes(),
            &[
                TemplateNode::literal("x = "),
                TemplateNode::Interpolation(interp("first")),
                TemplateNode::literal(" + \"a\" + "),
                TemplateNode::Interpolation(interp("second")),
                TemplateNode::literal(";\n"),
            ]
        );

        // Without quote protection the quoted `a` counts as a second occurrence.
        let err = generate(
            transformed(text, &["a", "b"], WrapMode::Inline),
            &[interp("first"), interp("second")],
            &spec,
        )
        .unwrap_err();
        assert!(matches!(err, Error::PlaceholderMismatchError { .. }));
    }

    #[test]
    fn test_inline_duplicate_is_mismatch() {
        let spec = PreConversionSpec::new(TransformCommand::new("cat"));
        let err = generate(transformed("a + a", &["a"], WrapMode::Inline), &[interp("x")], &spec)
            .unwrap_err();
        match err {
            Error::PlaceholderMismatchError { reason, .. } => assert!(reason.contains("2 times")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_snippet_is_truncated() {
        let long = "é".repeat(SNIPPET_LEN + 10);
        let short = snippet(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), SNIPPET_LEN + 3);
    }
}
