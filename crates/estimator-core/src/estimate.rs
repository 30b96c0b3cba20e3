//! Rule-based estimation engine
//!
//! Converts a [`StructuredInput`] into an [`EstimateResult`]. The engine is a
//! pure function: no I/O, no randomness, same input gives the same output.
//!
//! The price is derived as a ledger. Each pipeline step takes the running
//! [`Ledger`] (base amount, effort hours, breakdown lines) and returns the
//! next one, appending at most one breakdown line. Rounding happens at every
//! multiplicative step so the breakdown always sums to the final base.

use crate::models::{
    AiFeatures, BreakdownLine, Complexity, EstimateResult, ProjectType, StructuredInput, Timeline,
};

/// Currency code for every estimate
pub const CURRENCY: &str = "USD";

/// Pages included in every base price
pub const INCLUDED_PAGES: u32 = 3;
pub const PRICE_PER_EXTRA_PAGE: i64 = 120;
pub const HOURS_PER_EXTRA_PAGE: f64 = 2.2;

/// Assumed focused hours per week (part-time freelance)
pub const WEEKLY_FOCUS_HOURS: f64 = 15.0;

/// Lower and upper bracket applied to the final base
pub const RANGE_LOW: f64 = 0.88;
pub const RANGE_HIGH: f64 = 1.12;

/// Pages above which phased delivery is suggested
const PHASED_DELIVERY_PAGES: u32 = 10;

const BASELINE_ASSUMPTIONS: [&str; 3] = [
    "Includes responsive UI and basic accessibility best practices",
    "One design iteration per page/screen included",
    "Content copy provided by client",
];
const ADMIN_PANEL_ASSUMPTION: &str = "Admin panel includes CRUD, basic role management";
const AI_BILLING_ASSUMPTION: &str =
    "AI feature cost assumes using hosted API (e.g. OpenAI) billed separately";

const SUGGEST_AUTH_LATER: &str = "Add authentication later to reduce initial scope";
const SUGGEST_PHASED_DELIVERY: &str = "Consider phased delivery splitting pages into milestones";
const SUGGEST_EXTEND_TIMELINE: &str = "Extending the timeline could reduce cost by ~20%";

/// Base amount and hours for a project type
///
/// `Other` has no entry of its own and uses the default (1000, 20).
pub fn type_base(project_type: ProjectType) -> (i64, f64) {
    match project_type {
        ProjectType::Landing => (600, 12.0),
        ProjectType::Script => (400, 8.0),
        ProjectType::WebApp => (1500, 30.0),
        ProjectType::Mobile => (1800, 36.0),
        ProjectType::Other => (1000, 20.0),
    }
}

pub fn complexity_multiplier(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Low => 1.0,
        Complexity::Medium => 1.35,
        Complexity::High => 1.75,
    }
}

pub fn timeline_multiplier(timeline: Timeline) -> f64 {
    match timeline {
        Timeline::Rushed => 1.25,
        Timeline::Flexible => 0.95,
        Timeline::Normal => 1.0,
    }
}

/// Flat add-on for the AI tier: (label, amount, hours)
fn ai_add_on(ai: AiFeatures) -> Option<(&'static str, i64, f64)> {
    match ai {
        AiFeatures::None => None,
        AiFeatures::Basic => Some(("Basic AI Features", 500, 10.0)),
        AiFeatures::Advanced => Some(("Advanced AI Features", 1200, 24.0)),
    }
}

/// Round to the nearest integer.
///
/// Every rounded quantity here is non-negative, where `f64::round` agrees
/// with round-half-up.
fn round(value: f64) -> i64 {
    value.round() as i64
}

/// Running state threaded through the pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub base: i64,
    pub hours: f64,
    pub breakdown: Vec<BreakdownLine>,
}

impl Ledger {
    /// Add a flat amount and its hours, always recording the line
    fn add(mut self, label: impl Into<String>, amount: i64, hours: f64) -> Self {
        self.base += amount;
        self.hours += hours;
        self.breakdown.push(BreakdownLine::new(label, amount));
        self
    }

    /// Scale the base, recording the rounded delta only when it is non-zero
    fn scale(mut self, label: impl Into<String>, multiplier: f64) -> Self {
        let scaled = round(self.base as f64 * multiplier);
        let delta = scaled - self.base;
        self.base = scaled;
        if delta != 0 {
            self.breakdown.push(BreakdownLine::new(label, delta));
        }
        self
    }
}

/// A single pure transform of the ledger
pub type Step = fn(Ledger, &StructuredInput) -> Ledger;

/// Pipeline steps in computation order
pub const PIPELINE: [Step; 5] = [
    base_for_type,
    extra_pages,
    feature_add_ons,
    complexity_uplift,
    timeline_adjustment,
];

pub fn base_for_type(ledger: Ledger, input: &StructuredInput) -> Ledger {
    let (amount, hours) = type_base(input.project_type);
    ledger.add(format!("Base ({})", input.project_type), amount, hours)
}

/// First three pages are free; the line is emitted even for zero extra pages
pub fn extra_pages(ledger: Ledger, input: &StructuredInput) -> Ledger {
    let extra = input.pages.saturating_sub(INCLUDED_PAGES);
    ledger.add(
        format!("Additional Pages ({})", extra),
        i64::from(extra) * PRICE_PER_EXTRA_PAGE,
        f64::from(extra) * HOURS_PER_EXTRA_PAGE,
    )
}

pub fn feature_add_ons(mut ledger: Ledger, input: &StructuredInput) -> Ledger {
    if input.auth {
        ledger = ledger.add("Authentication", 400, 8.0);
    }
    if input.admin_panel {
        ledger = ledger.add("Admin Panel", 600, 12.0);
    }
    if let Some((label, amount, hours)) = ai_add_on(input.ai_features) {
        ledger = ledger.add(label, amount, hours);
    }
    ledger
}

/// Multiplies the whole accumulated base (hours are untouched)
pub fn complexity_uplift(ledger: Ledger, input: &StructuredInput) -> Ledger {
    ledger.scale(
        format!("Complexity uplift ({})", input.complexity),
        complexity_multiplier(input.complexity),
    )
}

pub fn timeline_adjustment(ledger: Ledger, input: &StructuredInput) -> Ledger {
    ledger.scale("Timeline adjustment", timeline_multiplier(input.timeline))
}

/// Calendar weeks from unrounded effort hours, then timeline-adjusted
pub fn timeline_weeks(hours: f64, timeline: Timeline) -> i64 {
    let weeks = round(hours / WEEKLY_FOCUS_HOURS);
    match timeline {
        Timeline::Rushed => round(weeks as f64 * 0.75).max(1),
        Timeline::Flexible => round(weeks as f64 * 1.1),
        Timeline::Normal => weeks,
    }
}

pub fn assumptions(input: &StructuredInput) -> Vec<String> {
    let mut out: Vec<String> = BASELINE_ASSUMPTIONS.iter().map(|s| s.to_string()).collect();
    if input.admin_panel {
        out.push(ADMIN_PANEL_ASSUMPTION.to_string());
    }
    if input.ai_features != AiFeatures::None {
        out.push(AI_BILLING_ASSUMPTION.to_string());
    }
    out
}

pub fn suggestions(input: &StructuredInput) -> Vec<String> {
    let mut out = Vec::new();
    if !input.auth {
        out.push(SUGGEST_AUTH_LATER.to_string());
    }
    if input.pages > PHASED_DELIVERY_PAGES {
        out.push(SUGGEST_PHASED_DELIVERY.to_string());
    }
    if input.timeline == Timeline::Rushed {
        out.push(SUGGEST_EXTEND_TIMELINE.to_string());
    }
    out
}

/// Run the pipeline and return the ledger before the range is applied
pub fn run_pipeline(input: &StructuredInput) -> Ledger {
    PIPELINE
        .iter()
        .fold(Ledger::default(), |ledger, step| step(ledger, input))
}

/// Estimate cost and time for a structured project description
pub fn estimate(input: &StructuredInput) -> EstimateResult {
    let ledger = run_pipeline(input);

    tracing::debug!(
        project_type = %input.project_type,
        base = ledger.base,
        hours = ledger.hours,
        lines = ledger.breakdown.len(),
        "Computed rule estimate"
    );

    EstimateResult {
        min: round(ledger.base as f64 * RANGE_LOW),
        max: round(ledger.base as f64 * RANGE_HIGH),
        currency: CURRENCY.to_string(),
        hours: round(ledger.hours),
        timeline_weeks: timeline_weeks(ledger.hours, input.timeline),
        breakdown: ledger.breakdown,
        assumptions: assumptions(input),
        suggestions: suggestions(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landing_minimal() -> StructuredInput {
        StructuredInput {
            project_type: ProjectType::Landing,
            pages: 3,
            complexity: Complexity::Low,
            auth: false,
            admin_panel: false,
            ai_features: AiFeatures::None,
            timeline: Timeline::Normal,
            notes: String::new(),
        }
    }

    fn web_app_full() -> StructuredInput {
        StructuredInput {
            project_type: ProjectType::WebApp,
            pages: 8,
            complexity: Complexity::Medium,
            auth: true,
            admin_panel: true,
            ai_features: AiFeatures::Advanced,
            timeline: Timeline::Rushed,
            notes: String::new(),
        }
    }

    fn labels(result: &EstimateResult) -> Vec<&str> {
        result.breakdown.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn test_minimal_landing_page() {
        let result = estimate(&landing_minimal());

        assert_eq!(
            result.breakdown,
            vec![
                BreakdownLine::new("Base (landing)", 600),
                BreakdownLine::new("Additional Pages (0)", 0),
            ]
        );
        assert_eq!(result.base(), 600);
        assert_eq!(result.hours, 12);
        assert_eq!(result.timeline_weeks, 1);
        assert_eq!(result.min, 528);
        assert_eq!(result.max, 672);
        assert_eq!(result.currency, "USD");
    }

    #[test]
    fn test_full_featured_rushed_web_app() {
        let result = estimate(&web_app_full());

        assert_eq!(
            result.breakdown,
            vec![
                BreakdownLine::new("Base (web-app)", 1500),
                BreakdownLine::new("Additional Pages (5)", 600),
                BreakdownLine::new("Authentication", 400),
                BreakdownLine::new("Admin Panel", 600),
                BreakdownLine::new("Advanced AI Features", 1200),
                BreakdownLine::new("Complexity uplift (medium)", 1505),
                BreakdownLine::new("Timeline adjustment", 1451),
            ]
        );
        assert_eq!(result.base(), 7256);
        assert_eq!(result.hours, 85);
        assert_eq!(result.timeline_weeks, 5);
        assert_eq!(result.min, 6385);
        assert_eq!(result.max, 8127);
        assert_eq!(
            result.suggestions,
            vec!["Extending the timeline could reduce cost by ~20%".to_string()]
        );
        assert_eq!(result.assumptions.len(), 5);
    }

    #[test]
    fn test_unrecognized_type_uses_default_entry() {
        let input = StructuredInput {
            project_type: ProjectType::from_lenient(""),
            complexity: Complexity::Low,
            ..StructuredInput::default()
        };
        let ledger = run_pipeline(&input);
        assert_eq!(ledger.breakdown[0], BreakdownLine::new("Base (other)", 1000));
        assert_eq!(ledger.hours, 20.0);
    }

    #[test]
    fn test_no_ai_line_or_assumption_without_ai() {
        let result = estimate(&landing_minimal());
        assert!(!labels(&result).iter().any(|l| l.contains("AI")));
        assert!(!result.assumptions.iter().any(|a| a.contains("AI feature")));
    }

    #[test]
    fn test_basic_ai_adds_line_and_billing_assumption() {
        let input = StructuredInput {
            ai_features: AiFeatures::Basic,
            ..landing_minimal()
        };
        let result = estimate(&input);
        assert!(result
            .breakdown
            .contains(&BreakdownLine::new("Basic AI Features", 500)));
        assert!(!labels(&result).contains(&"Advanced AI Features"));
        assert_eq!(result.assumptions.last().unwrap(), AI_BILLING_ASSUMPTION);
    }

    #[test]
    fn test_zero_delta_lines_suppressed() {
        let result = estimate(&landing_minimal());
        assert!(!labels(&result)
            .iter()
            .any(|l| l.starts_with("Complexity uplift")));
        assert!(!labels(&result).contains(&"Timeline adjustment"));
    }

    #[test]
    fn test_flexible_timeline_discounts() {
        let input = StructuredInput {
            timeline: Timeline::Flexible,
            ..landing_minimal()
        };
        let result = estimate(&input);
        assert_eq!(
            result.breakdown.last().unwrap(),
            &BreakdownLine::new("Timeline adjustment", -30)
        );
        assert_eq!(result.base(), 570);
        assert_eq!(result.min, 502);
        assert_eq!(result.max, 638);
        assert_eq!(result.timeline_weeks, 1);
    }

    #[test]
    fn test_high_complexity_mobile() {
        let input = StructuredInput {
            project_type: ProjectType::Mobile,
            pages: 12,
            complexity: Complexity::High,
            ai_features: AiFeatures::Basic,
            ..StructuredInput::default()
        };
        let result = estimate(&input);
        assert_eq!(result.base(), 5915);
        assert!(result
            .breakdown
            .contains(&BreakdownLine::new("Complexity uplift (high)", 2535)));
        assert_eq!(result.hours, 66);
        assert_eq!(result.timeline_weeks, 4);
        assert_eq!(result.min, 5205);
        assert_eq!(result.max, 6625);
        assert_eq!(
            result.suggestions,
            vec![
                SUGGEST_AUTH_LATER.to_string(),
                SUGGEST_PHASED_DELIVERY.to_string()
            ]
        );
    }

    #[test]
    fn test_rushed_weeks_never_below_one() {
        assert_eq!(timeline_weeks(4.0, Timeline::Rushed), 1);
        assert_eq!(timeline_weeks(4.0, Timeline::Normal), 0);
    }

    #[test]
    fn test_baseline_assumptions_always_present() {
        for input in [landing_minimal(), web_app_full()] {
            let result = estimate(&input);
            assert_eq!(&result.assumptions[..3], &BASELINE_ASSUMPTIONS[..]);
        }
    }

    #[test]
    fn test_suggestions_may_be_empty() {
        let input = StructuredInput {
            auth: true,
            ..landing_minimal()
        };
        assert!(estimate(&input).suggestions.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let input = web_app_full();
        assert_eq!(estimate(&input), estimate(&input));
    }

    #[test]
    fn test_ledger_matches_range_for_all_enum_combinations() {
        for &project_type in ProjectType::all() {
            for &complexity in Complexity::all() {
                for &ai_features in AiFeatures::all() {
                    for &timeline in Timeline::all() {
                        for pages in [1, 3, 4, 11, 40] {
                            let input = StructuredInput {
                                project_type,
                                pages,
                                complexity,
                                auth: pages % 2 == 0,
                                admin_panel: pages > 10,
                                ai_features,
                                timeline,
                                notes: String::new(),
                            };
                            let result = estimate(&input);
                            let base = result.base();
                            assert_eq!(base, run_pipeline(&input).base);
                            assert_eq!(result.min, (base as f64 * RANGE_LOW).round() as i64);
                            assert_eq!(result.max, (base as f64 * RANGE_HIGH).round() as i64);
                            assert!(result.min <= base && base <= result.max);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_monotonic_in_pages() {
        let mut prev = estimate(&StructuredInput {
            pages: 1,
            ..web_app_full()
        });
        for pages in 2..=60 {
            let next = estimate(&StructuredInput {
                pages,
                ..web_app_full()
            });
            assert!(next.min >= prev.min);
            assert!(next.max >= prev.max);
            assert!(next.hours >= prev.hours);
            prev = next;
        }
    }

    #[test]
    fn test_monotonic_in_complexity_and_ai_tier() {
        let by_complexity: Vec<i64> = Complexity::all()
            .iter()
            .map(|&complexity| {
                estimate(&StructuredInput {
                    complexity,
                    ..web_app_full()
                })
                .max
            })
            .collect();
        assert!(by_complexity.windows(2).all(|w| w[0] <= w[1]));

        let by_ai: Vec<i64> = AiFeatures::all()
            .iter()
            .map(|&ai_features| {
                estimate(&StructuredInput {
                    ai_features,
                    ..landing_minimal()
                })
                .min
            })
            .collect();
        assert!(by_ai.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_pipeline_steps_individually() {
        let input = web_app_full();
        let ledger = base_for_type(Ledger::default(), &input);
        assert_eq!(ledger.base, 1500);
        let ledger = extra_pages(ledger, &input);
        assert_eq!(ledger.base, 2100);
        let ledger = feature_add_ons(ledger, &input);
        assert_eq!(ledger.base, 4300);
        let ledger = complexity_uplift(ledger, &input);
        assert_eq!(ledger.base, 5805);
        let ledger = timeline_adjustment(ledger, &input);
        assert_eq!(ledger.base, 7256);
    }
}
