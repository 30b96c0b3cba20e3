//! Pluggable AI backend abstraction for free-form extraction
//!
//! Free-form project descriptions are turned into a [`StructuredInput`] by an
//! external language model. The model output is untrusted: it is parsed into
//! a [`PartialStructuredInput`] and every field is re-validated by
//! [`normalize_extraction`] before the rule engine sees it.
//!
//! # Architecture
//!
//! - `AIBackend` trait: the single extraction operation plus metadata
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai_compatible, mock). Default: openai_compatible
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (defaults to api.openai.com when only a key is set)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_COMPATIBLE_API_KEY` or `OPENAI_API_KEY`: API key

mod mock;
pub mod normalize;
pub mod openai_compatible;
pub mod parsing;
pub mod prompt;
pub mod types;

pub use mock::MockBackend;
pub use normalize::normalize_extraction;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::PartialStructuredInput;

use async_trait::async_trait;

use crate::config::AiConfig;
use crate::error::Result;
use crate::estimate::estimate;
use crate::models::{EstimateResult, StructuredInput};

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Extract project scope attributes from a free-form description
    async fn extract_project(&self, description: &str) -> Result<PartialStructuredInput>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI chat completions API or any compatible server
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from the `[ai]` config section
    ///
    /// Credentials and host still come from the environment. Returns None
    /// when the OpenAI-compatible backend has neither.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        match config.backend.to_lowercase().as_str() {
            "openai_compatible" | "openai" => {
                OpenAICompatibleBackend::from_config(config).map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::mock()),
            other => {
                tracing::warn!(backend = %other, "Unknown AI backend, falling back to openai_compatible");
                OpenAICompatibleBackend::from_config(config).map(AIClient::OpenAICompatible)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn extract_project(&self, description: &str) -> Result<PartialStructuredInput> {
        match self {
            AIClient::OpenAICompatible(b) => b.extract_project(description).await,
            AIClient::Mock(b) => b.extract_project(description).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

/// Extract, re-validate, then run the rule engine
///
/// Returns the normalized input alongside the estimate so callers can show
/// what the model understood.
pub async fn estimate_freeform<B>(
    backend: &B,
    description: &str,
) -> Result<(StructuredInput, EstimateResult)>
where
    B: AIBackend + ?Sized,
{
    let partial = backend.extract_project(description).await?;
    let input = normalize_extraction(&partial);

    tracing::info!(
        model = backend.model(),
        project_type = %input.project_type,
        pages = input.pages,
        complexity = %input.complexity,
        "Free-form description extracted"
    );

    let result = estimate(&input);
    Ok((input, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{ProjectType, Timeline};

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[test]
    fn test_ai_client_from_config_mock() {
        let config = AiConfig {
            backend: "Mock".to_string(),
            ..AiConfig::default()
        };
        let client = AIClient::from_config(&config).unwrap();
        assert!(matches!(client, AIClient::Mock(_)));
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AIClient::mock();
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_estimate_freeform_with_mock() {
        let client = AIClient::mock();
        let (input, result) = estimate_freeform(
            &client,
            "Landing page for a bakery, 5 pages, no rush at all",
        )
        .await
        .unwrap();

        assert_eq!(input.project_type, ProjectType::Landing);
        assert_eq!(input.pages, 5);
        assert_eq!(input.timeline, Timeline::Flexible);
        assert_eq!(result.breakdown[0].label, "Base (landing)");
    }

    #[tokio::test]
    async fn test_estimate_freeform_defaults_invalid_fields() {
        let client = AIClient::Mock(MockBackend::with_raw_response(
            r#"{"projectType": "spaceship", "pages": -4, "timeline": "yesterday"}"#,
        ));
        let (input, _) = estimate_freeform(&client, "whatever").await.unwrap();
        assert_eq!(input.project_type, ProjectType::WebApp);
        assert_eq!(input.pages, 3);
        assert_eq!(input.timeline, Timeline::Normal);
    }

    #[tokio::test]
    async fn test_estimate_freeform_surfaces_unparseable_output() {
        let client = AIClient::Mock(MockBackend::with_raw_response("I cannot help with that"));
        let err = estimate_freeform(&client, "whatever").await.unwrap_err();
        match err {
            Error::Extraction { raw, .. } => assert_eq!(raw, "I cannot help with that"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
