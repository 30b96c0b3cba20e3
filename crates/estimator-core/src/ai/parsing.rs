//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap the JSON payload in prose or code fences; the payload
//! is taken to be everything from the first `{` to the last `}`.

use serde_json::Value;

use crate::error::{Error, Result};

use super::types::PartialStructuredInput;

/// Maximum raw response length echoed back in log messages
const LOG_TRUNCATE: usize = 200;

/// Parse extraction output from an AI response
pub fn parse_extraction(response: &str) -> Result<PartialStructuredInput> {
    let trimmed = response.trim();
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');

    let json_str = match (start, end) {
        (Some(s), Some(e)) if s < e => &trimmed[s..=e],
        _ => trimmed,
    };

    let value: Value = serde_json::from_str(json_str).map_err(|e| {
        tracing::debug!(raw = %truncate(response), "Unparseable extraction response");
        Error::Extraction {
            message: format!("Invalid JSON from AI: {}", e),
            raw: response.to_string(),
        }
    })?;

    if !value.is_object() {
        return Err(Error::Extraction {
            message: "Expected a JSON object from AI".to_string(),
            raw: response.to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| Error::Extraction {
        message: format!("Invalid extraction shape: {}", e),
        raw: response.to_string(),
    })
}

fn truncate(s: &str) -> String {
    if s.len() > LOG_TRUNCATE {
        let cut = s
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= LOG_TRUNCATE)
            .last()
            .unwrap_or(0);
        format!("{}...", &s[..cut])
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_extraction() {
        let response = r#"{"projectType": "mobile", "pages": 6, "auth": true}"#;
        let result = parse_extraction(response).unwrap();
        assert_eq!(result.project_type, Some(json!("mobile")));
        assert_eq!(result.pages, Some(json!(6)));
        assert_eq!(result.auth, Some(json!(true)));
        assert_eq!(result.timeline, None);
    }

    #[test]
    fn test_parse_extraction_with_text() {
        let response = r#"Here is the JSON:
```json
{"projectType": "landing", "notes": "Bakery {menu} site"}
```
Done!"#;
        let result = parse_extraction(response).unwrap();
        assert_eq!(result.project_type, Some(json!("landing")));
        assert_eq!(result.notes, Some(json!("Bakery {menu} site")));
    }

    #[test]
    fn test_parse_extraction_empty_object() {
        let result = parse_extraction("{}").unwrap();
        assert_eq!(result, PartialStructuredInput::default());
    }

    #[test]
    fn test_parse_extraction_no_json() {
        let err = parse_extraction("Sorry, I can't do that").unwrap_err();
        match err {
            Error::Extraction { raw, .. } => assert_eq!(raw, "Sorry, I can't do that"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_extraction_rejects_non_object() {
        assert!(matches!(
            parse_extraction("[1, 2, 3]"),
            Err(Error::Extraction { .. })
        ));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate(&long);
        assert!(out.ends_with("..."));
        assert!(out.len() <= LOG_TRUNCATE + 5);
    }
}
