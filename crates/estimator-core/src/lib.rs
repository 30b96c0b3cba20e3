//! Estimator Core Library
//!
//! Shared functionality for the project cost estimator:
//! - Domain model for structured project scope and estimate results
//! - Deterministic rule-based estimation engine
//! - Request validation for untrusted estimate requests
//! - Pluggable AI backends for free-form extraction (OpenAI-compatible, mock)
//! - Injectable rate limiting
//! - Input hints and invoice export
//! - Configuration loading

pub mod ai;
pub mod config;
pub mod error;
pub mod estimate;
pub mod export;
pub mod hints;
pub mod models;
pub mod rate_limit;
pub mod validate;

/// Test utilities including a mock OpenAI-compatible server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    estimate_freeform, normalize_extraction, AIBackend, AIClient, MockBackend,
    OpenAICompatibleBackend, PartialStructuredInput,
};
pub use config::{AiConfig, EstimatorConfig, ServerSettings};
pub use error::{Error, Result};
pub use estimate::estimate;
pub use export::{ExportFormat, Invoice, InvoiceOptions};
pub use hints::{freeform_hints, structured_hints};
pub use models::{
    AiFeatures, BreakdownLine, Complexity, EstimateResult, EstimateSource, ProjectType,
    StructuredInput, Timeline,
};
pub use rate_limit::{FixedWindowLimiter, RateLimiter};
pub use validate::{parse_request, EstimateRequest, RequestError, ValidationIssue};
