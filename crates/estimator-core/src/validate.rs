//! Validation of untrusted estimate requests
//!
//! Turns a raw request body into an [`EstimateRequest`]. Nothing is coerced
//! here: every field that fails its constraint is reported as a
//! [`ValidationIssue`] and the whole request is rejected.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{AiFeatures, Complexity, ProjectType, StructuredInput, Timeline};

/// Maximum accepted body size (16 KB)
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Free-form description length bounds (characters)
pub const MIN_DESCRIPTION_CHARS: usize = 5;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Maximum notes length (characters)
pub const MAX_NOTES_CHARS: usize = 500;

/// Maximum pages accepted from a client
pub const MAX_PAGES: u32 = 200;

/// A validated estimate request
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateRequest {
    Structured(StructuredInput),
    Freeform { description: String },
}

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Payload too large (limit {limit} bytes)")]
    PayloadTooLarge { limit: usize },

    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Validation failed: {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),
}

/// Parse and validate a request body
pub fn parse_request(body: &[u8]) -> Result<EstimateRequest, RequestError> {
    if body.len() > MAX_BODY_BYTES {
        return Err(RequestError::PayloadTooLarge {
            limit: MAX_BODY_BYTES,
        });
    }

    let raw: Value = serde_json::from_slice(body).map_err(|_| RequestError::InvalidJson)?;
    if is_falsy(&raw) {
        return Err(RequestError::InvalidJson);
    }

    validate_value(&raw)
}

/// Validate an already-parsed JSON value
pub fn validate_value(raw: &Value) -> Result<EstimateRequest, RequestError> {
    let Some(obj) = raw.as_object() else {
        return Err(RequestError::Validation(vec![ValidationIssue::new(
            "",
            "Expected object",
        )]));
    };

    match obj.get("mode").and_then(Value::as_str) {
        Some("freeform") => validate_freeform(obj),
        Some("structured") => validate_structured(obj),
        _ => Err(RequestError::Validation(vec![ValidationIssue::new(
            "mode",
            "Expected 'freeform' or 'structured'",
        )])),
    }
}

fn validate_freeform(obj: &Map<String, Value>) -> Result<EstimateRequest, RequestError> {
    let description = match obj.get("description") {
        Some(Value::String(s)) => s,
        Some(_) => return Err(single("description", "Expected string")),
        None => return Err(single("description", "Required")),
    };

    let chars = description.chars().count();
    if chars < MIN_DESCRIPTION_CHARS {
        return Err(single(
            "description",
            format!(
                "String must contain at least {} character(s)",
                MIN_DESCRIPTION_CHARS
            ),
        ));
    }
    if chars > MAX_DESCRIPTION_CHARS {
        return Err(single(
            "description",
            format!(
                "String must contain at most {} character(s)",
                MAX_DESCRIPTION_CHARS
            ),
        ));
    }

    Ok(EstimateRequest::Freeform {
        description: description.clone(),
    })
}

fn validate_structured(obj: &Map<String, Value>) -> Result<EstimateRequest, RequestError> {
    let mut issues = Vec::new();

    let project_type = enum_field::<ProjectType>(obj, "projectType", &mut issues);
    let complexity = enum_field::<Complexity>(obj, "complexity", &mut issues);
    let ai_features = enum_field::<AiFeatures>(obj, "aiFeatures", &mut issues);
    let timeline = enum_field::<Timeline>(obj, "timeline", &mut issues);
    let auth = bool_field(obj, "auth", &mut issues);
    let admin_panel = bool_field(obj, "adminPanel", &mut issues);
    let pages = pages_field(obj, &mut issues);
    let notes = notes_field(obj, &mut issues);

    match (
        project_type,
        pages,
        complexity,
        auth,
        admin_panel,
        ai_features,
        timeline,
        notes,
    ) {
        (
            Some(project_type),
            Some(pages),
            Some(complexity),
            Some(auth),
            Some(admin_panel),
            Some(ai_features),
            Some(timeline),
            Some(notes),
        ) if issues.is_empty() => Ok(EstimateRequest::Structured(StructuredInput {
            project_type,
            pages,
            complexity,
            auth,
            admin_panel,
            ai_features,
            timeline,
            notes,
        })),
        _ => Err(RequestError::Validation(issues)),
    }
}

fn single(path: &str, message: impl Into<String>) -> RequestError {
    RequestError::Validation(vec![ValidationIssue::new(path, message)])
}

fn enum_field<T: std::str::FromStr>(
    obj: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<T> {
    match obj.get(key) {
        Some(Value::String(s)) => match s.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                issues.push(ValidationIssue::new(
                    key,
                    format!("Invalid enum value '{}'", s),
                ));
                None
            }
        },
        Some(_) => {
            issues.push(ValidationIssue::new(key, "Expected string"));
            None
        }
        None => {
            issues.push(ValidationIssue::new(key, "Required"));
            None
        }
    }
}

fn bool_field(
    obj: &Map<String, Value>,
    key: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<bool> {
    match obj.get(key) {
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            issues.push(ValidationIssue::new(key, "Expected boolean"));
            None
        }
        None => {
            issues.push(ValidationIssue::new(key, "Required"));
            None
        }
    }
}

fn pages_field(obj: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) -> Option<u32> {
    let value = match obj.get("pages") {
        Some(Value::Number(n)) => n,
        Some(_) => {
            issues.push(ValidationIssue::new("pages", "Expected number"));
            return None;
        }
        None => {
            issues.push(ValidationIssue::new("pages", "Required"));
            return None;
        }
    };

    // 8 and 8.0 are the same JSON number
    let pages = match value.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => f,
        _ => {
            issues.push(ValidationIssue::new("pages", "Expected integer"));
            return None;
        }
    };

    if pages <= 0.0 {
        issues.push(ValidationIssue::new(
            "pages",
            "Number must be greater than 0",
        ));
        return None;
    }
    if pages > f64::from(MAX_PAGES) {
        issues.push(ValidationIssue::new(
            "pages",
            format!("Number must be less than or equal to {}", MAX_PAGES),
        ));
        return None;
    }

    Some(pages as u32)
}

fn notes_field(obj: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) -> Option<String> {
    match obj.get("notes") {
        None => Some(String::new()),
        Some(Value::String(s)) if s.chars().count() <= MAX_NOTES_CHARS => Some(s.clone()),
        Some(Value::String(_)) => {
            issues.push(ValidationIssue::new(
                "notes",
                format!(
                    "String must contain at most {} character(s)",
                    MAX_NOTES_CHARS
                ),
            ));
            None
        }
        Some(_) => {
            issues.push(ValidationIssue::new("notes", "Expected string"));
            None
        }
    }
}

/// JSON values that a JavaScript-style truthiness check treats as false
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0 || f.is_nan()).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
