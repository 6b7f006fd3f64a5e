//! Template types, placeholder tokens and error definitions

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Identifier the built-in default template is registered under
pub const DEFAULT_TEMPLATE_ID: &str = "++default-template++";

/// Token the snippet transformer may replace with CSS. Blanked if left over.
pub const ADDITIONAL_CSS_TOKEN: &str = "__ADDITIONAL_CSS__";

/// Element the surface measures and snapshots
pub const CONTAINER_MARKER: &str = "<div id=\"render_container\"";

/// Template-specific error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    UnknownTemplate(String),

    #[error("Invalid template {identifier}: {reason}")]
    InvalidTemplate { identifier: String, reason: String },

    #[error("Missing required attribute: {0}")]
    MissingAttribute(&'static str),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// A registered HTML template
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    /// Registry key
    pub identifier: String,

    /// Raw HTML containing the placeholder tokens
    pub body: String,

    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

impl Template {
    pub fn new(identifier: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            body: body.into(),
            registered_at: Utc::now(),
        }
    }

    /// Validate the template body
    pub fn validate(&self) -> TemplateResult<()> {
        validate_template(&self.body).map_err(|reason| TemplateError::InvalidTemplate {
            identifier: self.identifier.clone(),
            reason,
        })
    }
}

/// Placeholder tokens every template must contain.
///
/// The declaration order is the substitution order. `Body` goes last so
/// snippet content never passes through the attribute replacements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    LineHeight,
    FontSize,
    FontFamily,
    TargetWidth,
    TargetHeight,
    TextColor,
    BackgroundColor,
    Body,
}

impl Placeholder {
    pub const ALL: [Placeholder; 8] = [
        Placeholder::LineHeight,
        Placeholder::FontSize,
        Placeholder::FontFamily,
        Placeholder::TargetWidth,
        Placeholder::TargetHeight,
        Placeholder::TextColor,
        Placeholder::BackgroundColor,
        Placeholder::Body,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Placeholder::LineHeight => "__LINE_HEIGHT__",
            Placeholder::FontSize => "__FONT_SIZE__",
            Placeholder::FontFamily => "__FONT_FAMILY__",
            Placeholder::TargetWidth => "__OUTPUT_WIDTH__",
            Placeholder::TargetHeight => "__OUTPUT_HEIGHT__",
            Placeholder::TextColor => "__TEXT_COLOR__",
            Placeholder::BackgroundColor => "__BACKGROUND_COLOR__",
            Placeholder::Body => "__HTML_BODY__",
        }
    }
}

/// Check a template body for every required token and the container marker.
///
/// Returns a description of the first missing piece.
pub fn validate_template(body: &str) -> Result<(), String> {
    for placeholder in Placeholder::ALL {
        if !body.contains(placeholder.token()) {
            return Err(format!("missing placeholder {}", placeholder.token()));
        }
    }

    if !body.contains(CONTAINER_MARKER) {
        return Err(format!("missing container element {}>", CONTAINER_MARKER));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_body() -> String {
        let tokens: Vec<&str> = Placeholder::ALL.iter().map(|p| p.token()).collect();
        format!("{}{}>{}</div>", tokens.join(" "), CONTAINER_MARKER, "")
    }

    #[test]
    fn test_validate_complete_body() {
        assert!(validate_template(&complete_body()).is_ok());
    }

    #[test]
    fn test_validate_reports_missing_token() {
        let body = complete_body().replace("__FONT_FAMILY__", "");
        let reason = validate_template(&body).unwrap_err();
        assert!(reason.contains("__FONT_FAMILY__"));
    }

    #[test]
    fn test_validate_requires_container() {
        let body = complete_body().replace(CONTAINER_MARKER, "<div");
        let template = Template::new("no-container", body);
        assert!(matches!(
            template.validate(),
            Err(TemplateError::InvalidTemplate { ref identifier, .. }) if identifier == "no-container"
        ));
    }
}
