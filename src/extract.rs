//! Interpolation extraction.
//! Separates the literal spans of a parsed template from its interpolation
//! sites, in order and without deduplication.

use crate::config::EscapeRules;
use crate::escape::EscapeScanner;
use crate::template::{push_node, Interpolation, TemplateNode};
use log::debug;

/// The interpolation sites of a template and its normalized node sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub nodes: Vec<TemplateNode>,
    pub interpolations: Vec<Interpolation>,
}

impl Extraction {
    pub fn has_interpolations(&self) -> bool {
        !self.interpolations.is_empty()
    }

    /// Concatenation of every literal span.
    pub fn literal_text(&self) -> String {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                TemplateNode::Literal(text) => Some(text.as_str()),
                TemplateNode::Interpolation(_) => None,
            })
            .collect()
    }
}

/// Collects every interpolation node in order.
///
/// An interpolation that sits inside a region protected by `rules` (an open
/// string or a line comment) is not an interpolation site; it is folded back
/// into the literal text as its marker spelling. Adjacent literals are merged.
pub fn extract(nodes: Vec<TemplateNode>, rules: &EscapeRules) -> Extraction {
    let mut scanner = EscapeScanner::new(rules);
    let mut normalized = Vec::with_capacity(nodes.len());
    let mut interpolations = Vec::new();

    for node in nodes {
        match node {
            TemplateNode::Literal(text) => {
                scanner.feed(&text);
                push_node(&mut normalized, TemplateNode::Literal(text));
            }
            TemplateNode::Interpolation(interpolation) if scanner.is_protected() => {
                debug!("Interpolation '{}' is inside a protected region", interpolation.expr);
                let text = interpolation.to_marker_text();
                scanner.feed(&text);
                push_node(&mut normalized, TemplateNode::Literal(text));
            }
            TemplateNode::Interpolation(interpolation) => {
                interpolations.push(interpolation.clone());
                normalized.push(TemplateNode::Interpolation(interpolation));
            }
        }
    }

    debug!("Extracted {} interpolation sites", interpolations.len());
    Extraction {
        nodes: normalized,
        interpolations,
    }
}
