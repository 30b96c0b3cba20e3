//! Structured estimate command

use anyhow::{bail, Result};

use estimator_core::validate::MAX_NOTES_CHARS;
use estimator_core::{estimate, structured_hints, EstimateSource, StructuredInput};

use super::output::{emit_report, EstimateReport};
use crate::cli::OutputArgs;

pub fn cmd_estimate(input: &StructuredInput, output: &OutputArgs) -> Result<()> {
    if input.notes.chars().count() > MAX_NOTES_CHARS {
        bail!("Notes must be at most {} characters", MAX_NOTES_CHARS);
    }

    if !output.json {
        for hint in structured_hints(input) {
            println!("💡 {}", hint);
        }
    }

    let result = estimate(input);
    emit_report(
        &EstimateReport {
            source: EstimateSource::Rule,
            input,
            result: &result,
            summary: None,
        },
        output,
    )
}
