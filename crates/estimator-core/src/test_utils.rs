//! Test utilities for estimator-core
//!
//! Provides a mock OpenAI-compatible server that answers every chat
//! completion with canned content, for integration tests of the
//! OpenAI-compatible backend.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Mock OpenAI-compatible server for testing and development
pub struct MockOpenAIServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOpenAIServer {
    /// Start the mock server answering with a fixed web-app extraction
    pub async fn start() -> Self {
        Self::start_with_content(
            r#"{"projectType": "web-app", "pages": 5, "complexity": "medium", "auth": true, "adminPanel": false, "aiFeatures": "none", "timeline": "normal", "notes": "mock"}"#,
        )
        .await
    }

    /// Start the mock server answering every completion with `content`
    pub async fn start_with_content(content: &str) -> Self {
        let content = Arc::new(content.to_string());
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(content);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOpenAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "gpt-4o-mini", "object": "model"}]
    }))
}

async fn handle_chat(State(content): State<Arc<String>>, Json(request): Json<Value>) -> Json<Value> {
    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": request["model"],
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content.as_str()},
            "finish_reason": "stop"
        }]
    }))
}
