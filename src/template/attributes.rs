//! Typed style attributes merged into templates

use serde::{Deserialize, Serialize};

use super::color::Rgba;
use super::types::{TemplateError, TemplateResult};

/// System font names the surface mis-resolves; rendered with the fallback family instead
const BROKEN_FAMILY_ALIASES: &[&str] = &[".AppleSystemUIFont", ".SF UI Text"];

/// Font family and point size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub point_size: f32,
}

impl Font {
    pub fn new(family: impl Into<String>, point_size: f32) -> Self {
        Self {
            family: family.into(),
            point_size,
        }
    }
}

/// Style options a caller may set for a render.
///
/// Every field is optional; unset fields fall back to the renderer defaults
/// on [`merge`](StyleAttributes::merge). The font size is not a separate
/// option: it is derived from `font`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleAttributes {
    pub line_height: Option<f32>,
    pub font: Option<Font>,
    pub text_color: Option<Rgba>,
    pub background_color: Option<Rgba>,
    pub target_width: Option<f32>,
    /// Absent (or not positive) means "size to content"
    pub target_height: Option<f32>,
}

impl StyleAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults used when the configuration does not provide its own
    pub fn builtin_defaults() -> Self {
        Self {
            line_height: Some(1.0),
            font: Some(Font::new("Helvetica", 16.0)),
            text_color: Some(Rgba::BLACK),
            background_color: Some(Rgba::WHITE),
            target_width: Some(300.0),
            target_height: None,
        }
    }

    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = Some(line_height);
        self
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_text_color(mut self, color: Rgba) -> Self {
        self.text_color = Some(color);
        self
    }

    pub fn with_background_color(mut self, color: Rgba) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_target_width(mut self, width: f32) -> Self {
        self.target_width = Some(width);
        self
    }

    pub fn with_target_height(mut self, height: f32) -> Self {
        self.target_height = Some(height);
        self
    }

    /// Layer `overrides` on top of `self`. Values set in `overrides` win.
    pub fn merge(&self, overrides: &StyleAttributes) -> StyleAttributes {
        StyleAttributes {
            line_height: overrides.line_height.or(self.line_height),
            font: overrides.font.clone().or_else(|| self.font.clone()),
            text_color: overrides.text_color.or(self.text_color),
            background_color: overrides.background_color.or(self.background_color),
            target_width: overrides.target_width.or(self.target_width),
            target_height: overrides.target_height.or(self.target_height),
        }
    }

    /// Turn a merged attribute set into concrete values.
    ///
    /// Fails with [`TemplateError::MissingAttribute`] when a required value
    /// is absent, which only happens if the defaults themselves are incomplete.
    pub fn resolve(&self) -> TemplateResult<ResolvedStyle> {
        Ok(ResolvedStyle {
            line_height: self
                .line_height
                .ok_or(TemplateError::MissingAttribute("line_height"))?,
            font: self
                .font
                .clone()
                .ok_or(TemplateError::MissingAttribute("font"))?,
            text_color: self
                .text_color
                .ok_or(TemplateError::MissingAttribute("text_color"))?,
            background_color: self
                .background_color
                .ok_or(TemplateError::MissingAttribute("background_color"))?,
            target_width: self
                .target_width
                .ok_or(TemplateError::MissingAttribute("target_width"))?,
            target_height: self.target_height.filter(|h| *h > 0.0),
        })
    }
}

/// Fully resolved style, ready for substitution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub line_height: f32,
    pub font: Font,
    pub text_color: Rgba,
    pub background_color: Rgba,
    pub target_width: f32,
    pub target_height: Option<f32>,
}

impl ResolvedStyle {
    /// Derived font size in whole points
    pub fn font_size_pt(&self) -> i64 {
        self.font.point_size as i64
    }

    /// Font family with broken system aliases mapped to `fallback`
    pub fn display_family<'a>(&'a self, fallback: &'a str) -> &'a str {
        if BROKEN_FAMILY_ALIASES.contains(&self.font.family.as_str()) {
            fallback
        } else {
            &self.font.family
        }
    }

    /// CSS declaration for the container height
    pub fn height_css(&self) -> String {
        match self.target_height {
            Some(height) => format!("min-height: {}px", height as i64),
            None => "height: 100%".to_string(),
        }
    }
}
