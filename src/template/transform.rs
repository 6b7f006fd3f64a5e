//! Pluggable snippet/template pre-processing
//!
//! A [`SnippetTransformer`] runs before placeholder substitution and may
//! rewrite both the snippet and the template, for example to normalize font
//! sizes or inject per-element CSS ahead of [`ADDITIONAL_CSS_TOKEN`].
//! The host application supplies the strategy; two simple ones ship here.

use super::substitution::substitute_variables;
use super::types::ADDITIONAL_CSS_TOKEN;

/// Output of a transformer run
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub snippet: String,
    /// `None` keeps the template unchanged
    pub template: Option<String>,
}

impl Transformed {
    pub fn new(snippet: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            template: Some(template.into()),
        }
    }

    pub fn snippet_only(snippet: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            template: None,
        }
    }
}

/// Pre-processing hook: `(snippet, template) -> (snippet, template)`
pub trait SnippetTransformer: Send + Sync {
    fn transform(&self, snippet: &str, template: &str) -> Transformed;
}

impl<F> SnippetTransformer for F
where
    F: Fn(&str, &str) -> Transformed + Send + Sync,
{
    fn transform(&self, snippet: &str, template: &str) -> Transformed {
        self(snippet, template)
    }
}

/// Insert `css` ahead of the additional-CSS token, keeping the token so later
/// stages can inject more
pub fn inject_css(template: &str, css: &str) -> String {
    template.replace(
        ADDITIONAL_CSS_TOKEN,
        &format!("{}\n{}", css, ADDITIONAL_CSS_TOKEN),
    )
}

/// Fills `{{name}}` placeholders in the snippet from a variable map
#[derive(Debug, Clone, Default)]
pub struct VariableTransformer {
    variables: serde_json::Map<String, serde_json::Value>,
}

impl VariableTransformer {
    pub fn new(variables: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { variables }
    }

    /// Build from a JSON object; any other JSON value yields no variables
    pub fn from_json(variables: serde_json::Value) -> Self {
        match variables {
            serde_json::Value::Object(map) => Self::new(map),
            _ => Self::default(),
        }
    }
}

impl SnippetTransformer for VariableTransformer {
    fn transform(&self, snippet: &str, _template: &str) -> Transformed {
        Transformed::snippet_only(substitute_variables(snippet, &self.variables))
    }
}

/// Injects a fixed stylesheet into every template
#[derive(Debug, Clone)]
pub struct StylesheetTransformer {
    css: String,
}

impl StylesheetTransformer {
    pub fn new(css: impl Into<String>) -> Self {
        Self { css: css.into() }
    }
}

impl SnippetTransformer for StylesheetTransformer {
    fn transform(&self, snippet: &str, template: &str) -> Transformed {
        Transformed::new(snippet, inject_css(template, &self.css))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inject_css_keeps_token() {
        let template = "<style>__ADDITIONAL_CSS__</style>";
        let once = inject_css(template, "p { margin: 0; }");
        let twice = inject_css(&once, "#a { color: red; }");

        assert!(twice.contains("p { margin: 0; }"));
        assert!(twice.contains("#a { color: red; }"));
        assert_eq!(twice.matches(ADDITIONAL_CSS_TOKEN).count(), 1);
    }

    #[test]
    fn test_variable_transformer_leaves_template() {
        let transformer = VariableTransformer::from_json(json!({"guest_name": "Grace"}));
        let out = transformer.transform("<p>{{guest_name}}</p>", "<html></html>");

        assert_eq!(out, Transformed::snippet_only("<p>Grace</p>"));
    }

    #[test]
    fn test_closure_transformer() {
        let upper = |snippet: &str, template: &str| {
            Transformed::new(snippet.to_uppercase(), template.to_string())
        };
        let out = upper.transform("<p>x</p>", "t");
        assert_eq!(out.snippet, "<P>X</P>");
        assert_eq!(out.template.as_deref(), Some("t"));
    }
}
