//! HTML template system.
//!
//! This module provides:
//! - Template registry keyed by identifier
//! - Typed style attributes with default/override merging
//! - Placeholder validation and substitution producing final markup
//! - A pluggable snippet transformer hook run before substitution
//!
//! # Example
//!
//! ```ignore
//! let engine = TemplateEngine::new(StyleAttributes::builtin_defaults(), "Helvetica");
//!
//! engine.register(my_template_html, "badge");
//!
//! let markup = engine.render(
//!     "<p>Hello</p>",
//!     "badge",
//!     &StyleAttributes::new().with_target_width(480.0),
//! )?;
//! ```

mod attributes;
mod color;
mod engine;
mod store;
mod substitution;
mod transform;
mod types;

pub use attributes::{Font, ResolvedStyle, StyleAttributes};
pub use color::{ColorParseError, Rgba};
pub use engine::TemplateEngine;
pub use store::TemplateStore;
pub use substitution::{substitute_placeholders, substitute_variables};
pub use transform::{
    inject_css, SnippetTransformer, StylesheetTransformer, Transformed, VariableTransformer,
};
pub use types::{
    validate_template, Placeholder, Template, TemplateError, TemplateResult,
    ADDITIONAL_CSS_TOKEN, CONTAINER_MARKER, DEFAULT_TEMPLATE_ID,
};
