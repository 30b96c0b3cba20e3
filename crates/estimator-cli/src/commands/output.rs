//! Shared estimate output: terminal summary, JSON, file export

use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde_json::json;

use estimator_core::export::{default_file_name, format_amount};
use estimator_core::{
    EstimateResult, EstimateSource, ExportFormat, InvoiceOptions, StructuredInput,
};

use crate::cli::OutputArgs;

/// An estimate together with what produced it
pub struct EstimateReport<'a> {
    pub source: EstimateSource,
    pub input: &'a StructuredInput,
    pub result: &'a EstimateResult,
    /// The free-form description, when the input was extracted from one
    pub summary: Option<&'a str>,
}

/// Print the report and write the export file if requested
pub fn emit_report(report: &EstimateReport, output: &OutputArgs) -> Result<()> {
    if output.json {
        println!("{}", report_json(report)?);
    } else {
        print!("{}", format_summary(report, output)?);
    }

    if let Some(ref target) = output.export {
        let path = write_export(report, output, target, Local::now().date_naive())?;
        if output.json {
            tracing::info!(path = %path.display(), "Exported estimate");
        } else {
            println!("📄 Exported to {}", path.display());
        }
    }

    Ok(())
}

/// Same shape as the HTTP response body
pub fn report_json(report: &EstimateReport) -> Result<String> {
    let body = match report.source {
        EstimateSource::Rule => json!({
            "source": report.source,
            "estimate": report.result,
        }),
        EstimateSource::AiRule => json!({
            "source": report.source,
            "inputs": report.input,
            "estimate": report.result,
        }),
    };
    Ok(serde_json::to_string_pretty(&body)?)
}

pub fn format_summary(
    report: &EstimateReport,
    output: &OutputArgs,
) -> Result<String, fmt::Error> {
    let result = report.result;
    let input = report.input;
    let mut out = String::new();

    writeln!(out)?;
    writeln!(out, "💰 Estimate ({})", report.source)?;
    writeln!(
        out,
        "   ─────────────────────────────────────────────────────────────"
    )?;

    if report.source == EstimateSource::AiRule {
        let mut scope = vec![
            input.project_type.to_string(),
            format!("{} pages", input.pages),
            format!("{} complexity", input.complexity),
        ];
        if input.auth {
            scope.push("auth".to_string());
        }
        if input.admin_panel {
            scope.push("admin panel".to_string());
        }
        scope.push(format!("AI {}", input.ai_features));
        scope.push(format!("{} timeline", input.timeline));
        writeln!(out, "   Understood as: {}", scope.join(", "))?;
        if !input.notes.is_empty() {
            writeln!(out, "   Notes: {}", input.notes)?;
        }
        writeln!(out)?;
    }

    writeln!(
        out,
        "   Range: {} {} - {}",
        result.currency,
        format_amount(result.min),
        format_amount(result.max)
    )?;
    writeln!(
        out,
        "   Hours: {} (~{} weeks)",
        result.hours, result.timeline_weeks
    )?;

    writeln!(out)?;
    writeln!(out, "   Breakdown:")?;
    let width = result
        .breakdown
        .iter()
        .map(|line| line.label.chars().count())
        .max()
        .unwrap_or(0);
    for line in &result.breakdown {
        writeln!(
            out,
            "     {:<width$}  {} {:>8}",
            line.label,
            result.currency,
            format_amount(line.amount),
            width = width
        )?;
    }

    if !output.no_assumptions && !result.assumptions.is_empty() {
        writeln!(out)?;
        writeln!(out, "   Assumptions:")?;
        for assumption in &result.assumptions {
            writeln!(out, "     - {}", assumption)?;
        }
    }

    if !output.no_suggestions && !result.suggestions.is_empty() {
        writeln!(out)?;
        writeln!(out, "   💡 Optimization ideas:")?;
        for suggestion in &result.suggestions {
            writeln!(out, "     - {}", suggestion)?;
        }
    }

    writeln!(out)?;
    Ok(out)
}

/// Explicit `--format`, else the file extension, else text
pub fn resolve_format(explicit: Option<ExportFormat>, target: &Path) -> ExportFormat {
    explicit
        .or_else(|| {
            target
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(|ext| ext.parse().ok())
        })
        .unwrap_or_default()
}

/// Write the export and return the path written
///
/// A directory target gets a dated `estimate_YYYY-MM-DD.<ext>` file.
pub fn write_export(
    report: &EstimateReport,
    output: &OutputArgs,
    target: &Path,
    date: NaiveDate,
) -> Result<PathBuf> {
    let (path, format) = if target.is_dir() {
        let format = output.format.unwrap_or_default();
        (target.join(default_file_name(date, format)), format)
    } else {
        (target.to_path_buf(), resolve_format(output.format, target))
    };

    let opts = InvoiceOptions {
        source: Some(report.source),
        notes: Some(report.input.notes.clone()).filter(|n| !n.is_empty()),
        summary: report.summary.map(str::to_string),
        include_assumptions: !output.no_assumptions,
        include_suggestions: !output.no_suggestions,
        ..InvoiceOptions::new(date)
    };

    let content = format.render(report.result, &opts)?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write export: {}", path.display()))?;

    Ok(path)
}
