//! Template parser.
//! Turns raw template text into an ordered sequence of literal and
//! interpolation nodes. Recognized markers are `#{expr}`, `@{expr}` and
//! `@?{expr}`; a leading backslash (`\#{`) keeps a marker as literal text.

use crate::config::EscapeRules;
use crate::error::{Error, Result};
use crate::escape::EscapeScanner;
use crate::template::{push_node, Interpolation, InterpolationKind, SourceExpr, TemplateNode};
use log::debug;

const MARKERS: [InterpolationKind; 3] =
    [InterpolationKind::UrlParams, InterpolationKind::Url, InterpolationKind::Plain];

fn marker_at(rest: &str) -> Option<InterpolationKind> {
    MARKERS.into_iter().find(|kind| rest.starts_with(kind.marker()))
}

fn line_col(source: &str, pos: usize) -> (usize, usize) {
    let before = &source[..pos];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.chars().count(), |nl| {
        before[nl + 1..].chars().count()
    }) + 1;
    (line, column)
}

fn parse_error(source: &str, pos: usize, message: String) -> Error {
    let (line, column) = line_col(source, pos);
    Error::ParseError {
        line,
        column,
        message,
    }
}

/// Parses template text with no protected regions.
pub fn parse_template(source: &str) -> Result<Vec<TemplateNode>> {
    parse_template_with(source, &EscapeRules::default())
}

/// Parses template text. Markers inside regions protected by `rules` are kept
/// as literal text.
///
/// # Errors
/// * `Error::ParseError` for an unterminated marker or an invalid expression
pub fn parse_template_with(source: &str, rules: &EscapeRules) -> Result<Vec<TemplateNode>> {
    let mut nodes = Vec::new();
    let mut literal = String::new();
    let mut scanner = EscapeScanner::new(rules);
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];

        if !scanner.is_protected() {
            if let Some(kind) = rest.strip_prefix('\\').and_then(marker_at) {
                literal.push_str(kind.marker());
                pos += 1 + kind.marker().len();
                continue;
            }

            if let Some(kind) = marker_at(rest) {
                let expr_start = pos + kind.marker().len();
                let body = &source[expr_start..];
                let close = body
                    .find(['}', '\n'])
                    .filter(|&i| body.as_bytes()[i] == b'}')
                    .ok_or_else(|| {
                        parse_error(source, pos, format!("unterminated '{}' marker", kind.marker()))
                    })?;
                let expr = SourceExpr::parse(&body[..close]).map_err(|_| {
                    parse_error(
                        source,
                        expr_start,
                        format!("invalid interpolation expression '{}'", body[..close].trim()),
                    )
                })?;

                push_node(&mut nodes, TemplateNode::Literal(std::mem::take(&mut literal)));
                nodes.push(TemplateNode::Interpolation(Interpolation::new(expr, kind)));
                pos = expr_start + close + 1;
                continue;
            }
        }

        let len = scanner.step(rest);
        literal.push_str(&rest[..len]);
        pos += len;
    }

    push_node(&mut nodes, TemplateNode::Literal(literal));
    debug!("Parsed template into {} nodes", nodes.len());
    Ok(nodes)
}
