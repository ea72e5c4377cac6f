//! Template node types shared by every pipeline stage.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static EXPR_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.([A-Za-z_$][A-Za-z0-9_$]*|[0-9]+))*$")
        .expect("expression path pattern is valid")
});

/// A runtime-evaluated expression: a dotted path into the render bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceExpr(String);

impl SourceExpr {
    /// Parses and validates an expression path such as `user.name` or `items.0`.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if EXPR_PATH.is_match(text) {
            Ok(Self(text.to_string()))
        } else {
            Err(Error::ParseError {
                line: 1,
                column: 1,
                message: format!("invalid interpolation expression '{text}'"),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for SourceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SourceExpr {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SourceExpr> for String {
    fn from(value: SourceExpr) -> Self {
        value.0
    }
}

/// How an interpolated value is turned into script text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKind {
    /// `#{expr}`: the value as a script literal
    Plain,
    /// `@{expr}`: a quoted URL
    Url,
    /// `@?{expr}`: a quoted URL with query parameters
    UrlParams,
}

impl InterpolationKind {
    /// The opening marker that introduces this kind in template source.
    pub fn marker(self) -> &'static str {
        match self {
            InterpolationKind::Plain => "#{",
            InterpolationKind::Url => "@{",
            InterpolationKind::UrlParams => "@?{",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpolation {
    pub expr: SourceExpr,
    pub kind: InterpolationKind,
}

impl Interpolation {
    pub fn new(expr: SourceExpr, kind: InterpolationKind) -> Self {
        Self { expr, kind }
    }

    /// The interpolation spelled back as template source.
    pub fn to_marker_text(&self) -> String {
        format!("{}{}}}", self.kind.marker(), self.expr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TemplateNode {
    Literal(String),
    Interpolation(Interpolation),
}

impl TemplateNode {
    pub fn literal<S: Into<String>>(text: S) -> Self {
        TemplateNode::Literal(text.into())
    }

    pub fn plain(expr: &str) -> Result<Self> {
        Ok(TemplateNode::Interpolation(Interpolation::new(
            SourceExpr::parse(expr)?,
            InterpolationKind::Plain,
        )))
    }
}

/// Appends a node, merging it into a trailing literal when both are literals.
/// Empty literals are dropped.
pub(crate) fn push_node(nodes: &mut Vec<TemplateNode>, node: TemplateNode) {
    match node {
        TemplateNode::Literal(text) if text.is_empty() => {}
        TemplateNode::Literal(text) => match nodes.last_mut() {
            Some(TemplateNode::Literal(last)) => last.push_str(&text),
            _ => nodes.push(TemplateNode::Literal(text)),
        },
        interpolation => nodes.push(interpolation),
    }
}

/// Facts about how a template was compiled that the renderer may need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileMetadata {
    /// Placeholder identifiers, in interpolation order.
    pub placeholders: Vec<String>,
    /// Whether the synthetic wrapper was kept as an immediately-invoked call.
    pub wrapped: bool,
    /// Whether each call argument is parenthesized.
    pub parenthesized_args: bool,
}

/// The reusable result of pre-conversion. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledTemplate {
    nodes: Vec<TemplateNode>,
    metadata: CompileMetadata,
}

impl CompiledTemplate {
    pub fn new(nodes: Vec<TemplateNode>, metadata: CompileMetadata) -> Self {
        Self { nodes, metadata }
    }

    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    pub fn metadata(&self) -> &CompileMetadata {
        &self.metadata
    }

    /// The interpolations still to be substituted at render time, in order.
    pub fn interpolations(&self) -> impl Iterator<Item = &Interpolation> {
        self.nodes.iter().filter_map(|node| match node {
            TemplateNode::Interpolation(interpolation) => Some(interpolation),
            TemplateNode::Literal(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_paths() {
        assert!(SourceExpr::parse("a").is_ok());
        assert!(SourceExpr::parse(" user.name ").is_ok());
        assert!(SourceExpr::parse("items.0.id").is_ok());
        assert!(SourceExpr::parse("$el").is_ok());
        assert!(SourceExpr::parse("").is_err());
        assert!(SourceExpr::parse("a + b").is_err());
        assert!(SourceExpr::parse("0abc").is_err());
        assert!(SourceExpr::parse("a..b").is_err());
    }

    #[test]
    fn test_push_node_merges_literals() {
        let mut nodes = Vec::new();
        push_node(&mut nodes, TemplateNode::literal("a"));
        push_node(&mut nodes, TemplateNode::literal(""));
        push_node(&mut nodes, TemplateNode::literal("b"));
        push_node(&mut nodes, TemplateNode::plain("x").unwrap());
        push_node(&mut nodes, TemplateNode::literal("c"));
        assert_eq!(
            nodes,
            vec![
                TemplateNode::literal("ab"),
                TemplateNode::plain("x").unwrap(),
                TemplateNode::literal("c"),
            ]
        );
    }

    #[test]
    fn test_marker_text() {
        let interpolation =
            Interpolation::new(SourceExpr::parse("home").unwrap(), InterpolationKind::UrlParams);
        assert_eq!(interpolation.to_marker_text(), "@?{home}");
    }

    #[test]
    fn test_compiled_template_serializes() {
        let template = CompiledTemplate::new(
            vec![TemplateNode::literal("f("), TemplateNode::plain("a").unwrap()],
            CompileMetadata::default(),
        );
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["nodes"][0], serde_json::json!({"type": "literal", "value": "f("}));
        assert_eq!(
            json["nodes"][1],
            serde_json::json!({"type": "interpolation", "value": {"expr": "a", "kind": "plain"}})
        );
    }
}
