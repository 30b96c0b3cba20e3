//! Input hints
//!
//! Advisory messages about thin or risky input, shown before an estimate is
//! requested. Hints never block a request.

use regex::RegexBuilder;

use crate::models::{Complexity, StructuredInput, Timeline};

/// Page count above which phasing is worth mentioning
const LARGE_PAGE_COUNT: u32 = 25;

/// Descriptions shorter than this are probably missing scope
const MIN_DETAILED_DESCRIPTION: usize = 40;

pub fn structured_hints(input: &StructuredInput) -> Vec<String> {
    let mut hints = Vec::new();
    if input.pages == 0 {
        hints.push("Pages should be at least 1.".to_string());
    }
    if input.pages > LARGE_PAGE_COUNT {
        hints.push("Consider phasing large page counts.".to_string());
    }
    if input.complexity == Complexity::High && input.timeline == Timeline::Rushed {
        hints.push("High complexity + rushed timeline may increase risk.".to_string());
    }
    hints
}

pub fn freeform_hints(description: &str) -> Vec<String> {
    let mut hints = Vec::new();
    if description.chars().count() < MIN_DETAILED_DESCRIPTION {
        hints.push("Add more detail: target users, main features, timeline.".to_string());
    }
    if !mentions(description, r"auth|login|signup|sign up") {
        hints.push("Specify if user accounts / authentication are needed.".to_string());
    }
    if !mentions(description, r"admin|dashboard") {
        hints.push("Mention if an admin dashboard is required.".to_string());
    }
    hints
}

fn mentions(text: &str, pattern: &str) -> bool {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_hints() {
        let input = StructuredInput {
            pages: 30,
            complexity: Complexity::High,
            timeline: Timeline::Rushed,
            ..StructuredInput::default()
        };
        assert_eq!(
            structured_hints(&input),
            vec![
                "Consider phasing large page counts.".to_string(),
                "High complexity + rushed timeline may increase risk.".to_string(),
            ]
        );
        assert!(structured_hints(&StructuredInput::default()).is_empty());
    }

    #[test]
    fn test_freeform_hints_for_short_text() {
        assert_eq!(freeform_hints("A shop").len(), 3);
    }

    #[test]
    fn test_freeform_hints_satisfied() {
        let description =
            "Booking platform for a massage studio with user LOGIN and an Admin Dashboard";
        assert!(freeform_hints(description).is_empty());
    }
}
