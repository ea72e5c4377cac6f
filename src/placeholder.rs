//! Placeholder tokens.
//! Each interpolation site is stood in for by a unique identifier that the
//! transformation tool treats as an ordinary variable, so it can be found
//! again in the tool's output.

use crate::escape::ProtectedRegions;
use crate::template::SourceExpr;
use cruet::Inflector;
use indexmap::IndexSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderToken(String);

impl PlaceholderToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn base_name(prefix: &str, expr: &SourceExpr) -> String {
    let stem: String = expr
        .as_str()
        .to_snake_case()
        .chars()
        .map(|c| if is_ident_char(c) { c } else { '_' })
        .collect();
    if stem.is_empty() {
        format!("{prefix}expr")
    } else {
        format!("{prefix}{stem}")
    }
}

/// Generates one token per expression, in order.
///
/// Names are derived from the expression path. A name that was already
/// handed out, or that occurs anywhere in `literal_text`, gets a numeric
/// suffix until it is free.
pub fn generate_placeholders<'a, I>(
    exprs: I,
    literal_text: &str,
    prefix: &str,
) -> Vec<PlaceholderToken>
where
    I: IntoIterator<Item = &'a SourceExpr>,
{
    let mut used: IndexSet<String> = IndexSet::new();
    for expr in exprs {
        let base = base_name(prefix, expr);
        let mut candidate = base.clone();
        let mut n = 1;
        while used.contains(&candidate) || literal_text.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        used.insert(candidate);
    }
    used.into_iter().map(PlaceholderToken).collect()
}

/// Byte offsets where `token` occurs as a whole identifier outside any
/// protected region.
pub fn find_occurrences(
    text: &str,
    token: &PlaceholderToken,
    regions: &ProtectedRegions,
) -> Vec<usize> {
    text.match_indices(token.as_str())
        .map(|(pos, _)| pos)
        .filter(|&pos| {
            let before_ok = text[..pos]
                .chars()
                .next_back()
                .map_or(true, |c| !is_ident_char(c));
            let after_ok = text[pos + token.as_str().len()..]
                .chars()
                .next()
                .map_or(true, |c| !is_ident_char(c));
            before_ok && after_ok && !regions.contains(pos)
        })
        .collect()
}
