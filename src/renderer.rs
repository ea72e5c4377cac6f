//! Rendering of compiled templates.
//! Substitutes runtime bindings into a compiled node sequence. Rendering only
//! reads the template, so one compiled template can be rendered concurrently.

use crate::error::{Error, Result};
use crate::template::{CompiledTemplate, Interpolation, InterpolationKind, SourceExpr, TemplateNode};
use url::form_urlencoded;
use url::Url;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a compiled template with the given bindings.
    ///
    /// # Arguments
    /// * `template` - Compiled template to render
    /// * `context` - Bindings looked up by each interpolation's path
    ///
    /// # Returns
    /// * `Result<String>` - Rendered script text
    fn render(&self, template: &CompiledTemplate, context: &serde_json::Value) -> Result<String>;
}

/// Renders interpolated values as JavaScript literals.
#[derive(Debug, Clone, Default)]
pub struct JavascriptRenderer {
    /// Base that relative URLs are resolved against
    base_url: Option<Url>,
}

impl JavascriptRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url: Some(base_url),
        }
    }

    fn resolve_url(&self, url: &str) -> Result<String> {
        match &self.base_url {
            Some(base) => base
                .join(url)
                .map(String::from)
                .map_err(|e| Error::RenderError(format!("cannot resolve URL '{url}': {e}"))),
            None => Ok(url.to_string()),
        }
    }

    fn render_interpolation(
        &self,
        interpolation: &Interpolation,
        context: &serde_json::Value,
    ) -> Result<String> {
        let value = lookup(context, &interpolation.expr)?;
        let rendered = match interpolation.kind {
            InterpolationKind::Plain => value.clone(),
            InterpolationKind::Url => {
                let path = value.as_str().ok_or_else(|| {
                    Error::RenderError(format!(
                        "URL binding '{}' is not a string",
                        interpolation.expr
                    ))
                })?;
                serde_json::Value::String(self.resolve_url(path)?)
            }
            InterpolationKind::UrlParams => {
                let path = url_with_params(&interpolation.expr, value)?;
                serde_json::Value::String(self.resolve_url(&path)?)
            }
        };
        serde_json::to_string(&rendered).map_err(|e| Error::RenderError(e.to_string()))
    }
}

impl TemplateRenderer for JavascriptRenderer {
    fn render(&self, template: &CompiledTemplate, context: &serde_json::Value) -> Result<String> {
        let mut out = String::new();
        for node in template.nodes() {
            match node {
                TemplateNode::Literal(text) => out.push_str(text),
                TemplateNode::Interpolation(interpolation) => {
                    out.push_str(&self.render_interpolation(interpolation, context)?)
                }
            }
        }
        Ok(out)
    }
}

/// Follows a dotted path through objects and arrays.
pub fn lookup<'v>(
    context: &'v serde_json::Value,
    expr: &SourceExpr,
) -> Result<&'v serde_json::Value> {
    let mut current = context;
    for segment in expr.segments() {
        let next = match current {
            serde_json::Value::Object(map) => map.get(segment),
            serde_json::Value::Array(items) => {
                segment.parse::<usize>().ok().and_then(|index| items.get(index))
            }
            _ => None,
        };
        current = next.ok_or_else(|| Error::RenderError(format!("no binding for '{expr}'")))?;
    }
    Ok(current)
}

fn param_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds `path?k=v&...` from `{"path": "...", "params": {...}}`, where
/// `params` is an object or a list of `[key, value]` pairs.
fn url_with_params(expr: &SourceExpr, value: &serde_json::Value) -> Result<String> {
    let invalid = || {
        Error::RenderError(format!(
            "URL binding '{expr}' must be an object with a string 'path' and 'params'"
        ))
    };
    let path = value.get("path").and_then(serde_json::Value::as_str).ok_or_else(invalid)?;

    let mut query = form_urlencoded::Serializer::new(String::new());
    match value.get("params") {
        Some(serde_json::Value::Object(params)) => {
            for (key, v) in params {
                query.append_pair(key, &param_value(v));
            }
        }
        Some(serde_json::Value::Array(pairs)) => {
            for pair in pairs {
                match pair.as_array().map(Vec::as_slice) {
                    Some([key, v]) => {
                        query.append_pair(&param_value(key), &param_value(v));
                    }
                    _ => return Err(invalid()),
                }
            }
        }
        None | Some(serde_json::Value::Null) => {}
        Some(_) => return Err(invalid()),
    }
    let query = query.finish();

    if query.is_empty() {
        Ok(path.to_string())
    } else if path.contains('?') {
        Ok(format!("{path}&{query}"))
    } else {
        Ok(format!("{path}?{query}"))
    }
}
