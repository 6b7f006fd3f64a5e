//! Merges a snippet, a registered template and style attributes into markup

use std::sync::{Arc, PoisonError, RwLock};

use super::attributes::{ResolvedStyle, StyleAttributes};
use super::store::TemplateStore;
use super::substitution::substitute_placeholders;
use super::transform::SnippetTransformer;
use super::types::{
    validate_template, TemplateError, TemplateResult, ADDITIONAL_CSS_TOKEN, DEFAULT_TEMPLATE_ID,
};

const DEFAULT_TEMPLATE: &str = include_str!("../../templates/default_template.html");

/// Template engine owning the template registry and attribute defaults
pub struct TemplateEngine {
    store: TemplateStore,
    defaults: StyleAttributes,
    fallback_family: String,
    transformer: RwLock<Option<Arc<dyn SnippetTransformer>>>,
}

impl TemplateEngine {
    /// Create an engine with the built-in default template registered
    pub fn new(defaults: StyleAttributes, fallback_family: impl Into<String>) -> Self {
        let engine = Self {
            store: TemplateStore::new(),
            defaults,
            fallback_family: fallback_family.into(),
            transformer: RwLock::new(None),
        };
        engine.register_default_template();
        engine
    }

    /// The built-in template. Always passes validation.
    pub fn default_template() -> &'static str {
        DEFAULT_TEMPLATE
    }

    pub fn register_default_template(&self) {
        self.store.register(DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_ID);
    }

    pub fn register(&self, body: impl Into<String>, identifier: impl Into<String>) {
        self.store.register(body, identifier);
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn defaults(&self) -> &StyleAttributes {
        &self.defaults
    }

    pub fn set_transformer(&self, transformer: Arc<dyn SnippetTransformer>) {
        *self
            .transformer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(transformer);
    }

    pub fn clear_transformer(&self) {
        *self
            .transformer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Merge caller attributes over the defaults and resolve them
    pub fn resolve(&self, attributes: &StyleAttributes) -> TemplateResult<ResolvedStyle> {
        self.defaults.merge(attributes).resolve()
    }

    /// Produce final markup for `snippet` using the template `template_id`.
    ///
    /// Unregistered identifiers fail with `UnknownTemplate`; there is no
    /// fallback to the default template.
    pub fn render(
        &self,
        snippet: &str,
        template_id: &str,
        attributes: &StyleAttributes,
    ) -> TemplateResult<String> {
        let style = self.resolve(attributes)?;
        self.render_resolved(snippet, template_id, &style)
    }

    /// Like [`render`](Self::render) with an already resolved style
    pub fn render_resolved(
        &self,
        snippet: &str,
        template_id: &str,
        style: &ResolvedStyle,
    ) -> TemplateResult<String> {
        let template = self.store.get(template_id)?;
        template.validate()?;

        let transformer = self
            .transformer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let (snippet, body) = match transformer {
            Some(transformer) => {
                let transformed = transformer.transform(snippet, &template.body);
                let body = transformed.template.unwrap_or(template.body);
                (transformed.snippet, body)
            }
            None => (snippet.to_string(), template.body),
        };

        // The hook may rewrite the template; it must still be complete
        validate_template(&body).map_err(|reason| TemplateError::InvalidTemplate {
            identifier: template_id.to_string(),
            reason: format!("after snippet transform: {}", reason),
        })?;

        let body = body.replace(ADDITIONAL_CSS_TOKEN, "");

        Ok(substitute_placeholders(
            &body,
            &snippet,
            style,
            &self.fallback_family,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{inject_css, Placeholder, Transformed};

    fn engine() -> TemplateEngine {
        TemplateEngine::new(StyleAttributes::builtin_defaults(), "Helvetica")
    }

    #[test]
    fn test_default_template_is_valid() {
        assert!(validate_template(TemplateEngine::default_template()).is_ok());
        assert!(engine().store().exists(DEFAULT_TEMPLATE_ID));
    }

    #[test]
    fn test_render_default_template() {
        let markup = engine()
            .render("<p>x</p>", DEFAULT_TEMPLATE_ID, &StyleAttributes::new())
            .unwrap();

        assert!(markup.contains("<p>x</p>"));
        assert!(markup.contains("#000000"));
        assert!(markup.contains("#ffffff"));
        assert!(!markup.contains("__"));
    }

    #[test]
    fn test_unknown_template_does_not_fall_back() {
        let err = engine()
            .render("<p>x</p>", "missing", &StyleAttributes::new())
            .unwrap_err();
        assert_eq!(err, TemplateError::UnknownTemplate("missing".to_string()));
    }

    #[test]
    fn test_each_missing_token_invalidates() {
        let engine = engine();
        for placeholder in Placeholder::ALL {
            let body = TemplateEngine::default_template().replace(placeholder.token(), "");
            engine.register(body, "broken");

            let err = engine
                .render("<p>x</p>", "broken", &StyleAttributes::new())
                .unwrap_err();
            assert!(
                matches!(err, TemplateError::InvalidTemplate { .. }),
                "removing {} should invalidate the template",
                placeholder.token()
            );
        }
    }

    #[test]
    fn test_caller_width_wins() {
        let markup = engine()
            .render(
                "<p>x</p>",
                DEFAULT_TEMPLATE_ID,
                &StyleAttributes::new().with_target_width(500.0),
            )
            .unwrap();

        assert!(markup.contains("500"));
        assert!(!markup.contains("300"));
    }

    #[test]
    fn test_target_height() {
        let engine = engine();

        let natural = engine
            .render("<p>x</p>", DEFAULT_TEMPLATE_ID, &StyleAttributes::new())
            .unwrap();
        assert!(natural.contains("height: 100%"));
        assert!(!natural.contains("min-height"));

        let fixed = engine
            .render(
                "<p>x</p>",
                DEFAULT_TEMPLATE_ID,
                &StyleAttributes::new().with_target_height(400.0),
            )
            .unwrap();
        assert!(fixed.contains("min-height: 400px"));
    }

    #[test]
    fn test_missing_default_attribute() {
        let mut defaults = StyleAttributes::builtin_defaults();
        defaults.target_width = None;
        let engine = TemplateEngine::new(defaults, "Helvetica");

        let err = engine
            .render("<p>x</p>", DEFAULT_TEMPLATE_ID, &StyleAttributes::new())
            .unwrap_err();
        assert_eq!(err, TemplateError::MissingAttribute("target_width"));
    }

    #[test]
    fn test_transformer_rewrites_snippet_and_template() {
        let engine = engine();
        engine.set_transformer(Arc::new(|snippet: &str, template: &str| {
            Transformed::new(
                format!("<div class=\"label\">{}</div>", snippet),
                inject_css(template, ".label { text-align: center; }"),
            )
        }));

        let markup = engine
            .render("<p>x</p>", DEFAULT_TEMPLATE_ID, &StyleAttributes::new())
            .unwrap();
        assert!(markup.contains("<div class=\"label\"><p>x</p></div>"));
        assert!(markup.contains(".label { text-align: center; }"));
        assert!(!markup.contains(ADDITIONAL_CSS_TOKEN));
    }

    #[test]
    fn test_transformer_unchanged_template() {
        let engine = engine();
        engine.set_transformer(Arc::new(|snippet: &str, _template: &str| {
            Transformed::snippet_only(snippet.replace("x", "y"))
        }));

        let markup = engine
            .render("<p>x</p>", DEFAULT_TEMPLATE_ID, &StyleAttributes::new())
            .unwrap();
        assert!(markup.contains("<p>y</p>"));

        engine.clear_transformer();
        let markup = engine
            .render("<p>x</p>", DEFAULT_TEMPLATE_ID, &StyleAttributes::new())
            .unwrap();
        assert!(markup.contains("<p>x</p>"));
    }

    #[test]
    fn test_transformer_breaking_template_is_invalid() {
        let engine = engine();
        engine.set_transformer(Arc::new(|snippet: &str, _template: &str| {
            Transformed::new(snippet, "<html></html>")
        }));

        let err = engine
            .render("<p>x</p>", DEFAULT_TEMPLATE_ID, &StyleAttributes::new())
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTemplate { .. }));
    }
}
