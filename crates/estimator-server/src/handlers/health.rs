//! Liveness handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use estimator_core::AIBackend;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Host of the configured AI backend, if any
    pub ai_backend: Option<String>,
}

/// GET /api/health - Liveness and AI backend presence
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ai_backend: state.ai.as_ref().map(|ai| ai.host().to_string()),
    })
}
