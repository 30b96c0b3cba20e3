//! Estimate handler
//!
//! Checks run in a fixed order: origin, rate limit, body size, JSON,
//! validation. Only then is the rule engine (or the AI backend) involved.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{client_key, is_origin_allowed, AppError, AppState};
use estimator_core::validate::MAX_BODY_BYTES;
use estimator_core::{
    estimate, estimate_freeform, parse_request, EstimateRequest, EstimateResult, EstimateSource,
    RequestError, StructuredInput,
};

/// Successful estimate response
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub source: EstimateSource,
    /// Normalized input the AI extraction produced (free-form only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<StructuredInput>,
    pub estimate: EstimateResult,
}

/// POST /api/estimate - Estimate from structured input or a free-form description
pub async fn post_estimate(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<EstimateResponse>, AppError> {
    if !is_origin_allowed(request.headers(), &state.config.allowed_origins) {
        warn!(
            referer = ?request.headers().get("referer"),
            "Rejected estimate request from disallowed origin"
        );
        return Err(AppError::forbidden("Origin not allowed"));
    }

    let connect_info = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .cloned();
    let client = client_key(
        request.headers(),
        connect_info.as_ref(),
        &state.config.trusted_proxies,
    );
    if !state.limiter.allow(&client) {
        info!(client = %client, "Rate limited estimate request");
        return Err(AppError::too_many_requests(
            state.limiter.retry_after_secs(&client),
        ));
    }

    let body = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            debug!(error = %e, "Failed to read estimate body");
            request_error(RequestError::PayloadTooLarge {
                limit: MAX_BODY_BYTES,
            })
        })?;

    match parse_request(&body).map_err(request_error)? {
        EstimateRequest::Structured(input) => {
            let result = estimate(&input);
            Ok(Json(EstimateResponse {
                source: EstimateSource::Rule,
                inputs: None,
                estimate: result,
            }))
        }
        EstimateRequest::Freeform { description } => {
            let Some(ai) = state.ai.as_ref() else {
                return Err(AppError::internal("AI extraction backend not configured")
                    .with_detail(
                        "suggestion",
                        "Set OPENAI_API_KEY (or OPENAI_COMPATIBLE_HOST) server-side to enable AI parsing.",
                    ));
            };

            match estimate_freeform(ai, &description).await {
                Ok((input, result)) => Ok(Json(EstimateResponse {
                    source: EstimateSource::AiRule,
                    inputs: Some(input),
                    estimate: result,
                })),
                Err(estimator_core::Error::Extraction { message, raw }) => {
                    warn!(error = %message, "AI extraction returned unparseable output");
                    Err(AppError::bad_gateway("AI parsing failed").with_detail("raw", raw))
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn request_error(err: RequestError) -> AppError {
    match err {
        RequestError::PayloadTooLarge { .. } => AppError::payload_too_large("Payload too large"),
        RequestError::InvalidJson => AppError::bad_request("Invalid JSON"),
        RequestError::Validation(issues) => {
            AppError::bad_request("Validation failed").with_detail("issues", json!(issues))
        }
    }
}
