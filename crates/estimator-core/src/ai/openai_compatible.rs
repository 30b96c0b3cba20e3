//! OpenAI-compatible backend implementation
//!
//! Works with the hosted OpenAI API and with any server that implements the
//! chat completions API (vLLM, LocalAI, llama-server, ...).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (default https://api.openai.com when a key is set)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_COMPATIBLE_API_KEY` / `OPENAI_API_KEY`: API key
//! - `OPENAI_COMPATIBLE_TIMEOUT_SECS`: Request timeout (default: 30)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::error::{Error, Result};

use super::parsing::parse_extraction;
use super::prompt::{extraction_prompt, SYSTEM_PROMPT};
use super::types::PartialStructuredInput;
use super::AIBackend;

pub const DEFAULT_HOST: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sampling temperature for extraction; low to keep answers stable
const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self::with_timeout(base_url, model, DEFAULT_TIMEOUT)
    }

    /// Create with an explicit request timeout
    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Set the API key sent as a bearer token
    pub fn api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Create with model and timeout from config; host and key stay in the environment
    ///
    /// Returns None unless a host or an API key is configured.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());
        let host = match std::env::var("OPENAI_COMPATIBLE_HOST") {
            Ok(host) if !host.is_empty() => host,
            _ if api_key.is_some() => DEFAULT_HOST.to_string(),
            _ => return None,
        };

        let mut backend = Self::with_timeout(&host, &config.model, timeout);
        backend.api_key = api_key;
        Some(backend)
    }

    /// Make a chat completion request and return the first choice's content
    async fn chat_completion(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(EXTRACTION_TEMPERATURE),
            response_format: Some(ResponseFormat {
                kind: "json_object".to_string(),
            }),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, model = %self.model, "Chat completion failed");
            return Err(Error::BackendUnavailable(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        // A missing choice is treated like an empty object, as the model gave nothing to parse
        Ok(chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "{}".to_string()))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn extract_project(&self, description: &str) -> Result<PartialStructuredInput> {
        let prompt = extraction_prompt(description);
        debug!(model = %self.model, chars = description.len(), "Requesting extraction");

        let content = self.chat_completion(&prompt).await?;
        parse_extraction(&content)
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        match req_builder.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, host = %self.base_url, "Health check failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockOpenAIServer;
    use serde_json::json;

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8080/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:8080");
        assert_eq!(backend.model(), "llama3.2");
    }

    #[tokio::test]
    async fn test_extract_against_mock_server() {
        let server = MockOpenAIServer::start_with_content(
            r#"{"projectType": "mobile", "pages": 5, "auth": true}"#,
        )
        .await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "gpt-4o-mini").api_key("sk-test");

        assert!(backend.health_check().await);
        let partial = backend.extract_project("A mobile app").await.unwrap();
        assert_eq!(partial.project_type, Some(json!("mobile")));
        assert_eq!(partial.pages, Some(json!(5)));
    }

    #[tokio::test]
    async fn test_extract_reports_unparseable_content() {
        let server = MockOpenAIServer::start_with_content("no json here").await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "gpt-4o-mini");

        match backend.extract_project("A mobile app").await {
            Err(Error::Extraction { raw, .. }) => assert_eq!(raw, "no json here"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unhealthy() {
        let backend = OpenAICompatibleBackend::with_timeout(
            "http://127.0.0.1:9",
            "gpt-4o-mini",
            Duration::from_millis(200),
        );
        assert!(!backend.health_check().await);
    }
}
