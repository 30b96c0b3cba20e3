//! Extraction prompt

/// System message sent ahead of every extraction request
pub const SYSTEM_PROMPT: &str = "You extract structured estimation inputs as valid JSON only. No prose.";

/// Build the user prompt for a free-form description
///
/// Backticks and `$` are stripped from the description so it cannot close
/// the quoted block or smuggle template syntax.
pub fn extraction_prompt(description: &str) -> String {
    let cleaned: String = description
        .chars()
        .filter(|c| *c != '`' && *c != '$')
        .collect();

    format!(
        "You are an assistant that extracts project scoping attributes from a free-form software project description for a freelance fullstack/AI engineer.\n\
         Return a JSON object with fields:\n\
         projectType (landing|web-app|script|mobile|other), pages (integer), complexity (low|medium|high), auth (boolean), adminPanel (boolean), aiFeatures (none|basic|advanced), timeline (flexible|normal|rushed), notes (short summary of key features).\n\
         If uncertain, make reasonable assumptions and note them in notes. Base choices on description below.\n\
         Description: \"\"\"{}\"\"\"",
        cleaned
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_strips_backticks_and_dollars() {
        let prompt = extraction_prompt("Shop ```ignore``` ${env} for $5");
        assert!(prompt.contains("Description: \"\"\"Shop ignore {env} for 5\"\"\""));
        assert!(!prompt.contains('`'));
    }

    #[test]
    fn test_prompt_lists_allowed_values() {
        let prompt = extraction_prompt("anything");
        assert!(prompt.contains("projectType (landing|web-app|script|mobile|other)"));
        assert!(prompt.contains("timeline (flexible|normal|rushed)"));
    }
}
