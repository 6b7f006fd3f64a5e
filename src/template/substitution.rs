//! Placeholder substitution for templates and snippets

use super::attributes::ResolvedStyle;
use super::types::Placeholder;

/// Replace every placeholder token in `template`.
///
/// One replace-all pass per token, in [`Placeholder::ALL`] order.
pub fn substitute_placeholders(
    template: &str,
    snippet: &str,
    style: &ResolvedStyle,
    fallback_family: &str,
) -> String {
    let mut result = template.to_string();

    for placeholder in Placeholder::ALL {
        let replacement = match placeholder {
            Placeholder::LineHeight => format!("{:.1}", style.line_height),
            Placeholder::FontSize => style.font_size_pt().to_string(),
            Placeholder::FontFamily => style.display_family(fallback_family).to_string(),
            Placeholder::TargetWidth => (style.target_width as i64).to_string(),
            Placeholder::TargetHeight => style.height_css(),
            Placeholder::TextColor => style.text_color.to_hex(true),
            Placeholder::BackgroundColor => style.background_color.to_hex(true),
            Placeholder::Body => snippet.to_string(),
        };
        result = result.replace(placeholder.token(), &replacement);
    }

    result
}

/// Substitute `{{variable}}` placeholders in a snippet
pub fn substitute_variables(
    snippet: &str,
    variables: &serde_json::Map<String, serde_json::Value>,
) -> String {
    let mut result = snippet.to_string();

    for (key, value) in variables {
        let pattern = format!("{{{{{}}}}}", key);
        let replacement = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => "".to_string(),
            // For arrays and objects, use JSON representation
            _ => value.to_string(),
        };
        result = result.replace(&pattern, &replacement);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Font, Rgba, StyleAttributes};
    use serde_json::json;

    fn style() -> ResolvedStyle {
        StyleAttributes::builtin_defaults()
            .with_font(Font::new("Georgia", 18.9))
            .with_line_height(1.5)
            .with_text_color(Rgba::rgb(0x33, 0x33, 0x33))
            .resolve()
            .unwrap()
    }

    #[test]
    fn test_substitute_all_tokens() {
        let template = "lh=__LINE_HEIGHT__ fs=__FONT_SIZE__ ff=__FONT_FAMILY__ \
                        w=__OUTPUT_WIDTH__ h=__OUTPUT_HEIGHT__ c=__TEXT_COLOR__ \
                        bg=__BACKGROUND_COLOR__ body=__HTML_BODY__";

        let result = substitute_placeholders(template, "<p>x</p>", &style(), "Helvetica");
        assert_eq!(
            result,
            "lh=1.5 fs=18 ff=Georgia w=300 h=height: 100% c=#333333 bg=#ffffff body=<p>x</p>"
        );
    }

    #[test]
    fn test_substitute_replaces_every_occurrence() {
        let template = "__OUTPUT_WIDTH__/__OUTPUT_WIDTH__/__OUTPUT_WIDTH__";
        let result = substitute_placeholders(template, "", &style(), "Helvetica");
        assert_eq!(result, "300/300/300");
    }

    #[test]
    fn test_snippet_is_not_substituted() {
        let result = substitute_placeholders("__HTML_BODY__", "__TEXT_COLOR__", &style(), "Helvetica");
        assert_eq!(result, "__TEXT_COLOR__");
    }

    #[test]
    fn test_substitute_variables() {
        let variables = json!({
            "guest_name": "Ada",
            "table": 7,
            "vip": true,
            "note": null
        });
        let variables = variables.as_object().unwrap();

        let result = substitute_variables(
            "<p>{{guest_name}} at {{table}} ({{vip}}){{note}} {{unknown}}</p>",
            variables,
        );
        assert_eq!(result, "<p>Ada at 7 (true) {{unknown}}</p>");
    }
}
