//! Re-validation of extraction output
//!
//! Each field is checked independently; an invalid field falls back to its
//! default instead of failing the whole request.

use serde_json::Value;

use crate::models::{AiFeatures, Complexity, ProjectType, StructuredInput, Timeline};
use crate::validate::{is_falsy, MAX_NOTES_CHARS, MAX_PAGES};

use super::types::PartialStructuredInput;

/// Pages used when the model gives no usable count
pub const DEFAULT_PAGES: u32 = 3;

/// Clamp untrusted extraction output into a valid [`StructuredInput`]
///
/// - projectType: must be a known type, else `web-app`
/// - pages: a number > 0, capped at 200 and rounded (at least 1), else 3
/// - complexity / aiFeatures / timeline: known value, else medium / none / normal
/// - auth / adminPanel: truthiness of whatever the model returned
/// - notes: string truncated to 500 characters, else empty
pub fn normalize_extraction(partial: &PartialStructuredInput) -> StructuredInput {
    StructuredInput {
        project_type: parse_enum(&partial.project_type).unwrap_or(ProjectType::WebApp),
        pages: normalize_pages(partial.pages.as_ref()),
        complexity: parse_enum(&partial.complexity).unwrap_or(Complexity::Medium),
        auth: truthy(partial.auth.as_ref()),
        admin_panel: truthy(partial.admin_panel.as_ref()),
        ai_features: parse_enum(&partial.ai_features).unwrap_or(AiFeatures::None),
        timeline: parse_enum(&partial.timeline).unwrap_or(Timeline::Normal),
        notes: normalize_notes(partial.notes.as_ref()),
    }
}

fn parse_enum<T: std::str::FromStr>(value: &Option<Value>) -> Option<T> {
    value.as_ref()?.as_str()?.parse().ok()
}

fn normalize_pages(value: Option<&Value>) -> u32 {
    match value.and_then(Value::as_f64) {
        Some(pages) if pages > 0.0 => {
            let capped = pages.min(f64::from(MAX_PAGES));
            (capped.round() as u32).max(1)
        }
        _ => DEFAULT_PAGES,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    value.map(|v| !is_falsy(v)).unwrap_or(false)
}

fn normalize_notes(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.chars().take(MAX_NOTES_CHARS).collect(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn partial(value: Value) -> PartialStructuredInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_fields_pass_through() {
        let input = normalize_extraction(&partial(json!({
            "projectType": "mobile",
            "pages": 7,
            "complexity": "high",
            "auth": true,
            "adminPanel": false,
            "aiFeatures": "advanced",
            "timeline": "rushed",
            "notes": "Fitness tracker"
        })));
        assert_eq!(input.project_type, ProjectType::Mobile);
        assert_eq!(input.pages, 7);
        assert_eq!(input.complexity, Complexity::High);
        assert!(input.auth);
        assert!(!input.admin_panel);
        assert_eq!(input.ai_features, AiFeatures::Advanced);
        assert_eq!(input.timeline, Timeline::Rushed);
        assert_eq!(input.notes, "Fitness tracker");
    }

    #[test]
    fn test_empty_extraction_uses_defaults() {
        let input = normalize_extraction(&PartialStructuredInput::default());
        assert_eq!(input, StructuredInput::default());
    }

    #[test]
    fn test_each_invalid_field_defaults_independently() {
        let input = normalize_extraction(&partial(json!({
            "projectType": "Mobile",
            "pages": 9,
            "complexity": 3,
            "aiFeatures": "basic",
            "timeline": null
        })));
        assert_eq!(input.project_type, ProjectType::WebApp);
        assert_eq!(input.pages, 9);
        assert_eq!(input.complexity, Complexity::Medium);
        assert_eq!(input.ai_features, AiFeatures::Basic);
        assert_eq!(input.timeline, Timeline::Normal);
    }

    #[test]
    fn test_pages_clamped() {
        let cases = [
            (json!(0), 3),
            (json!(-5), 3),
            (json!("12"), 3),
            (json!(500), 200),
            (json!(4.4), 4),
            (json!(0.2), 1),
        ];
        for (raw, expected) in cases {
            let input = normalize_extraction(&partial(json!({ "pages": raw })));
            assert_eq!(input.pages, expected);
        }
    }

    #[test]
    fn test_truthiness_of_flags() {
        let input = normalize_extraction(&partial(json!({"auth": "yes", "adminPanel": 0})));
        assert!(input.auth);
        assert!(!input.admin_panel);

        let input = normalize_extraction(&partial(json!({"auth": "", "adminPanel": [1]})));
        assert!(!input.auth);
        assert!(input.admin_panel);
    }

    #[test]
    fn test_notes_truncated() {
        let input = normalize_extraction(&partial(json!({"notes": "n".repeat(800)})));
        assert_eq!(input.notes.chars().count(), MAX_NOTES_CHARS);

        let input = normalize_extraction(&partial(json!({"notes": 42})));
        assert_eq!(input.notes, "");
    }
}
