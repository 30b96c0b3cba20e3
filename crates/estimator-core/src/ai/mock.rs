//! Mock backend for testing
//!
//! Extracts project attributes with simple keyword rules so the free-form
//! path can be exercised without a running LLM server. A canned raw response
//! can be injected to test parsing and normalization of odd model output.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use crate::error::{Error, Result};

use super::parsing::parse_extraction;
use super::types::PartialStructuredInput;
use super::AIBackend;

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true (and extraction succeed)
    pub healthy: bool,
    /// Raw model output to parse instead of the keyword rules
    pub raw_response: Option<String>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            raw_response: None,
        }
    }

    /// Create an unhealthy mock backend; extraction fails as unavailable
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            raw_response: None,
        }
    }

    /// Answer every extraction with this raw model output
    pub fn with_raw_response(raw: &str) -> Self {
        Self {
            healthy: true,
            raw_response: Some(raw.to_string()),
        }
    }

    fn keyword_extraction(description: &str) -> Value {
        let text = description.to_lowercase();
        let has = |pattern: &str| {
            Regex::new(pattern)
                .map(|re| re.is_match(&text))
                .unwrap_or(false)
        };

        let project_type = if has(r"\blanding\b") {
            "landing"
        } else if has(r"\b(mobile|ios|android)\b") {
            "mobile"
        } else if has(r"\b(script|scraper|automation|bot)\b") {
            "script"
        } else {
            "web-app"
        };

        let complexity = if has(r"\b(complex|real-?time|integrations?)\b") {
            "high"
        } else if has(r"\b(simple|basic|static)\b") {
            "low"
        } else {
            "medium"
        };

        let ai_features = if has(r"\b(agents?|custom model|fine-?tun\w*)\b") {
            "advanced"
        } else if has(r"\b(ai|gpt|llm|chatbot)\b") {
            "basic"
        } else {
            "none"
        };

        // "no rush" must win over "rush"
        let timeline = if has(r"\b(no rush|flexible|whenever)\b") {
            "flexible"
        } else if has(r"\b(asap|urgent|rush\w*)\b") {
            "rushed"
        } else {
            "normal"
        };

        let mut extracted = json!({
            "projectType": project_type,
            "complexity": complexity,
            "auth": has(r"\b(auth\w*|login|log in|sign ?up|accounts?)\b"),
            "adminPanel": has(r"\b(admin|dashboard)\b"),
            "aiFeatures": ai_features,
            "timeline": timeline,
            "notes": "Extracted by mock backend",
        });

        // "6-8 pages" takes the upper bound
        if let Ok(re) = Regex::new(r"(\d+)\s*(?:-|to)?\s*(\d+)?\s*(?:pages|screens)") {
            if let Some(caps) = re.captures(&text) {
                let count = caps
                    .get(2)
                    .or_else(|| caps.get(1))
                    .and_then(|m| m.as_str().parse::<u64>().ok());
                if let Some(count) = count {
                    extracted["pages"] = json!(count);
                }
            }
        }

        extracted
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn extract_project(&self, description: &str) -> Result<PartialStructuredInput> {
        if !self.healthy {
            return Err(Error::BackendUnavailable(
                "mock backend is unhealthy".to_string(),
            ));
        }

        if let Some(ref raw) = self.raw_response {
            return parse_extraction(raw);
        }

        let raw = Self::keyword_extraction(description).to_string();
        parse_extraction(&raw)
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_extraction() {
        let backend = MockBackend::new();
        let partial = backend
            .extract_project(
                "I need a web platform for booking massage appointments with user login, \
                 admin dashboard, 6-8 pages, maybe basic AI suggestions. Need it ASAP.",
            )
            .await
            .unwrap();

        assert_eq!(partial.project_type, Some(json!("web-app")));
        assert_eq!(partial.pages, Some(json!(8)));
        assert_eq!(partial.auth, Some(json!(true)));
        assert_eq!(partial.admin_panel, Some(json!(true)));
        assert_eq!(partial.ai_features, Some(json!("basic")));
        assert_eq!(partial.timeline, Some(json!("rushed")));
    }

    #[tokio::test]
    async fn test_no_page_count_leaves_pages_unset() {
        let backend = MockBackend::new();
        let partial = backend
            .extract_project("A scraper script for price tracking")
            .await
            .unwrap();
        assert_eq!(partial.project_type, Some(json!("script")));
        assert_eq!(partial.pages, None);
    }

    #[tokio::test]
    async fn test_unhealthy_mock_fails() {
        let backend = MockBackend::unhealthy();
        assert!(!backend.health_check().await);
        assert!(matches!(
            backend.extract_project("anything").await,
            Err(Error::BackendUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_raw_response_goes_through_parser() {
        let backend = MockBackend::with_raw_response("Sure! {\"pages\": 4} Hope that helps.");
        let partial = backend.extract_project("ignored").await.unwrap();
        assert_eq!(partial.pages, Some(json!(4)));
    }
}
