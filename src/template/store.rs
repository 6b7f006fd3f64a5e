//! Template registry keyed by identifier

use dashmap::DashMap;

use super::types::{Template, TemplateError, TemplateResult};

/// In-memory template storage.
///
/// Templates are stored verbatim; validation happens at render time.
pub struct TemplateStore {
    templates: DashMap<String, Template>,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore {
    /// Create an empty template store
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    /// Register a template, replacing any previous one with the same identifier
    pub fn register(&self, body: impl Into<String>, identifier: impl Into<String>) {
        let template = Template::new(identifier, body);
        let replaced = self
            .templates
            .insert(template.identifier.clone(), template)
            .is_some();

        tracing::debug!(replaced = replaced, "Template registered");
    }

    /// Get a template by identifier
    pub fn get(&self, identifier: &str) -> TemplateResult<Template> {
        self.templates
            .get(identifier)
            .map(|t| t.clone())
            .ok_or_else(|| TemplateError::UnknownTemplate(identifier.to_string()))
    }

    /// Check if a template exists
    pub fn exists(&self, identifier: &str) -> bool {
        self.templates.contains_key(identifier)
    }

    /// Identifiers of all registered templates
    pub fn identifiers(&self) -> Vec<String> {
        self.templates
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Get the number of templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }

    /// Remove every template
    pub fn clear(&self) {
        let removed = self.templates.len();
        self.templates.clear();
        tracing::debug!(removed = removed, "Template store cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_register_and_get() {
        let store = TemplateStore::new();
        store.register("<p>__HTML_BODY__</p>", "simple");

        let template = store.get("simple").unwrap();
        assert_eq!(template.identifier, "simple");
        assert_eq!(template.body, "<p>__HTML_BODY__</p>");
    }

    #[test]
    fn test_store_get_unknown() {
        let store = TemplateStore::new();
        assert_eq!(
            store.get("missing").unwrap_err(),
            TemplateError::UnknownTemplate("missing".to_string())
        );
    }

    #[test]
    fn test_store_register_does_not_validate() {
        let store = TemplateStore::new();
        store.register("not a template at all", "broken");
        assert!(store.exists("broken"));
    }

    #[test]
    fn test_store_register_overwrites() {
        let store = TemplateStore::new();
        store.register("first", "t");
        store.register("second", "t");

        assert_eq!(store.count(), 1);
        assert_eq!(store.get("t").unwrap().body, "second");
    }

    #[test]
    fn test_store_clear() {
        let store = TemplateStore::new();
        for i in 0..3 {
            store.register("body", format!("template-{}", i));
        }
        assert_eq!(store.identifiers().len(), 3);

        store.clear();
        assert_eq!(store.count(), 0);
        assert!(!store.exists("template-0"));
    }
}
