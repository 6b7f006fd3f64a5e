//! Caller-facing render request

use tokio::sync::mpsc;

use crate::template::{StyleAttributes, DEFAULT_TEMPLATE_ID};

use super::types::RenderOutcome;

/// Parameters of one render.
///
/// Uses the default template, reads from and writes to the cache unless told
/// otherwise.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub(crate) snippet: String,
    pub(crate) identifier: String,
    pub(crate) template_id: Option<String>,
    pub(crate) attributes: StyleAttributes,
    pub(crate) target_width: Option<f32>,
    pub(crate) target_height: Option<f32>,
    pub(crate) ignore_cache: bool,
    pub(crate) cache_result: bool,
    pub(crate) completion_channel: Option<mpsc::UnboundedSender<RenderOutcome>>,
}

impl RenderRequest {
    /// `identifier` is the cache key for the result
    pub fn new(snippet: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            identifier: identifier.into(),
            template_id: Some(DEFAULT_TEMPLATE_ID.to_string()),
            attributes: StyleAttributes::default(),
            target_width: None,
            target_height: None,
            ignore_cache: false,
            cache_result: true,
            completion_channel: None,
        }
    }

    pub fn template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Hand the snippet to the surface verbatim
    pub fn without_template(mut self) -> Self {
        self.template_id = None;
        self
    }

    pub fn attributes(mut self, attributes: StyleAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Overrides any width in the attributes
    pub fn target_width(mut self, width: f32) -> Self {
        self.target_width = Some(width);
        self
    }

    /// Overrides any height in the attributes; zero or less means natural height
    pub fn target_height(mut self, height: f32) -> Self {
        self.target_height = Some(height);
        self
    }

    /// Always render, even if the cache holds a result for the identifier
    pub fn ignore_cache(mut self, ignore: bool) -> Self {
        self.ignore_cache = ignore;
        self
    }

    /// Store a freshly rendered result in the cache
    pub fn cache_result(mut self, cache: bool) -> Self {
        self.cache_result = cache;
        self
    }

    /// Also send the outcome to `channel`
    pub fn deliver_to(mut self, channel: mpsc::UnboundedSender<RenderOutcome>) -> Self {
        self.completion_channel = Some(channel);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Attributes with the explicit size overrides applied
    pub fn effective_attributes(&self) -> StyleAttributes {
        let mut attributes = self.attributes.clone();
        if let Some(width) = self.target_width {
            attributes.target_width = Some(width);
        }
        if let Some(height) = self.target_height {
            attributes.target_height = Some(height);
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = RenderRequest::new("<p>x</p>", "A");
        assert_eq!(request.template_id.as_deref(), Some(DEFAULT_TEMPLATE_ID));
        assert!(!request.ignore_cache);
        assert!(request.cache_result);
        assert_eq!(request.identifier(), "A");
    }

    #[test]
    fn test_explicit_size_overrides_attributes() {
        let request = RenderRequest::new("<p>x</p>", "A")
            .target_width(640.0)
            .attributes(
                StyleAttributes::new()
                    .with_target_width(100.0)
                    .with_target_height(50.0),
            )
            .target_height(0.0);

        let attributes = request.effective_attributes();
        assert_eq!(attributes.target_width, Some(640.0));
        assert_eq!(attributes.target_height, Some(0.0));
    }
}
