//! Domain models for project scoping and estimates

use serde::{Deserialize, Serialize};

/// Kind of project being estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    Landing,
    WebApp,
    Script,
    Mobile,
    /// Anything else; priced with the default table entry
    Other,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::WebApp => "web-app",
            Self::Script => "script",
            Self::Mobile => "mobile",
            Self::Other => "other",
        }
    }

    pub fn all() -> &'static [ProjectType] {
        &[
            Self::Landing,
            Self::WebApp,
            Self::Script,
            Self::Mobile,
            Self::Other,
        ]
    }

    /// Lenient parse: unrecognized text (including "") maps to `Other`
    pub fn from_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::Other)
    }
}

impl std::str::FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "landing" => Ok(Self::Landing),
            "web-app" => Ok(Self::WebApp),
            "script" => Ok(Self::Script),
            "mobile" => Ok(Self::Mobile),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown project type: {}", s)),
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logic/integration depth of the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn all() -> &'static [Complexity] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown complexity: {}", s)),
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// AI feature tier requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiFeatures {
    None,
    Basic,
    Advanced,
}

impl AiFeatures {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Advanced => "advanced",
        }
    }

    pub fn all() -> &'static [AiFeatures] {
        &[Self::None, Self::Basic, Self::Advanced]
    }
}

impl std::str::FromStr for AiFeatures {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            _ => Err(format!("Unknown AI feature tier: {}", s)),
        }
    }
}

impl std::fmt::Display for AiFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeline {
    Flexible,
    Normal,
    Rushed,
}

impl Timeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flexible => "flexible",
            Self::Normal => "normal",
            Self::Rushed => "rushed",
        }
    }

    pub fn all() -> &'static [Timeline] {
        &[Self::Flexible, Self::Normal, Self::Rushed]
    }
}

impl std::str::FromStr for Timeline {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "flexible" => Ok(Self::Flexible),
            "normal" => Ok(Self::Normal),
            "rushed" => Ok(Self::Rushed),
            _ => Err(format!("Unknown timeline: {}", s)),
        }
    }
}

impl std::fmt::Display for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured project scope, the only input to the estimation engine
///
/// Callers are expected to have validated the ranges already (pages > 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredInput {
    pub project_type: ProjectType,
    /// Unique pages / screens
    pub pages: u32,
    pub complexity: Complexity,
    pub auth: bool,
    pub admin_panel: bool,
    pub ai_features: AiFeatures,
    pub timeline: Timeline,
    /// Free text, no effect on pricing
    #[serde(default)]
    pub notes: String,
}

impl Default for StructuredInput {
    fn default() -> Self {
        Self {
            project_type: ProjectType::WebApp,
            pages: 3,
            complexity: Complexity::Medium,
            auth: false,
            admin_panel: false,
            ai_features: AiFeatures::None,
            timeline: Timeline::Normal,
            notes: String::new(),
        }
    }
}

/// One named currency contribution to the running base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub label: String,
    pub amount: i64,
}

impl BreakdownLine {
    pub fn new(label: impl Into<String>, amount: i64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Result of a single estimation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResult {
    pub min: i64,
    pub max: i64,
    pub currency: String,
    /// Estimated effort hours (rounded)
    pub hours: i64,
    pub timeline_weeks: i64,
    /// Ordered ledger; order is computation order
    pub breakdown: Vec<BreakdownLine>,
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl EstimateResult {
    /// Sum of all breakdown amounts, i.e. the base before the range is applied
    pub fn base(&self) -> i64 {
        self.breakdown.iter().map(|line| line.amount).sum()
    }
}

/// How an estimate was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimateSource {
    /// Structured input straight into the rule engine
    #[serde(rename = "rule")]
    Rule,
    /// Free-form text extracted by an AI backend, then the rule engine
    #[serde(rename = "ai+rule")]
    AiRule,
}

impl EstimateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::AiRule => "ai+rule",
        }
    }
}

impl std::fmt::Display for EstimateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
