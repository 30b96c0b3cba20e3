//! AI backend response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Untrusted extraction output
///
/// Every field is optional and may hold any JSON type; nothing here is
/// trusted until it passes through [`super::normalize_extraction`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialStructuredInput {
    #[serde(default)]
    pub project_type: Option<Value>,
    #[serde(default)]
    pub pages: Option<Value>,
    #[serde(default)]
    pub complexity: Option<Value>,
    #[serde(default)]
    pub auth: Option<Value>,
    #[serde(default)]
    pub admin_panel: Option<Value>,
    #[serde(default)]
    pub ai_features: Option<Value>,
    #[serde(default)]
    pub timeline: Option<Value>,
    #[serde(default)]
    pub notes: Option<Value>,
}
