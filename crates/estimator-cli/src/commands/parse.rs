//! Free-form estimate command

use anyhow::{bail, Context, Result};

use estimator_core::validate::{MAX_DESCRIPTION_CHARS, MIN_DESCRIPTION_CHARS};
use estimator_core::{
    estimate_freeform, freeform_hints, AIBackend, AIClient, EstimateSource, EstimatorConfig,
};

use super::output::{emit_report, EstimateReport};
use crate::cli::OutputArgs;

pub async fn cmd_parse(
    config: &EstimatorConfig,
    description: &str,
    output: &OutputArgs,
) -> Result<()> {
    let chars = description.chars().count();
    if !(MIN_DESCRIPTION_CHARS..=MAX_DESCRIPTION_CHARS).contains(&chars) {
        bail!(
            "Description must be {}-{} characters (got {})",
            MIN_DESCRIPTION_CHARS,
            MAX_DESCRIPTION_CHARS,
            chars
        );
    }

    let ai = AIClient::from_config(&config.ai).context(
        "AI backend not configured. Set OPENAI_API_KEY (or OPENAI_COMPATIBLE_HOST), or AI_BACKEND=mock",
    )?;

    if !output.json {
        for hint in freeform_hints(description) {
            println!("💡 {}", hint);
        }
        println!("🤖 Extracting scope with {} ({})...", ai.model(), ai.host());
    }

    let (input, result) = match estimate_freeform(&ai, description).await {
        Ok(extracted) => extracted,
        Err(estimator_core::Error::Extraction { message, raw }) => {
            bail!("AI parsing failed: {}\n   Raw output: {}", message, raw)
        }
        Err(e) => return Err(e).context("AI extraction failed"),
    };

    emit_report(
        &EstimateReport {
            source: EstimateSource::AiRule,
            input: &input,
            result: &result,
            summary: Some(description),
        },
        output,
    )
}
