//! Estimate export
//!
//! Supports:
//! - Paginated plain-text invoice (one `Vec<String>` per page)
//! - Breakdown CSV (`label,amount`)
//! - JSON with the estimate and its source

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{EstimateResult, EstimateSource};

pub const INVOICE_TITLE: &str = "Project Estimate Invoice";
pub const INVOICE_FOOTER: &str = "Non-binding estimate. Final quote subject to detailed scoping.";

/// Width of the invoice body; breakdown amounts are right-aligned to it
pub const INVOICE_WIDTH: usize = 72;

/// Lines per page, matching a letter-size page at the invoice line height
pub const DEFAULT_LINES_PER_PAGE: usize = 41;

const MAX_NOTES_CHARS: usize = 80;
const MAX_SUMMARY_CHARS: usize = 120;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Render `result` in this format
    pub fn render(&self, result: &EstimateResult, opts: &InvoiceOptions) -> Result<String> {
        match self {
            Self::Text => Ok(Invoice::build(result, opts).render()),
            Self::Csv => to_csv(result),
            Self::Json => to_json(result, opts.source),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {} (expected text, csv or json)", s)),
        }
    }
}

/// Options for invoice rendering
#[derive(Debug, Clone)]
pub struct InvoiceOptions {
    pub date: NaiveDate,
    /// How the estimate was produced; printed as the mode line
    pub source: Option<EstimateSource>,
    pub notes: Option<String>,
    /// The free-form description, for AI-assisted estimates
    pub summary: Option<String>,
    pub include_assumptions: bool,
    pub include_suggestions: bool,
    pub lines_per_page: usize,
}

impl InvoiceOptions {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            source: None,
            notes: None,
            summary: None,
            include_assumptions: true,
            include_suggestions: true,
            lines_per_page: DEFAULT_LINES_PER_PAGE,
        }
    }
}

/// A rendered invoice, split into pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub pages: Vec<Vec<String>>,
}

impl Invoice {
    pub fn build(result: &EstimateResult, opts: &InvoiceOptions) -> Self {
        let mut pages = PageWriter::new(opts.lines_per_page);

        pages.push(INVOICE_TITLE.to_string());
        pages.blank();
        pages.push(format!("Date: {}", opts.date.format("%Y-%m-%d")));
        if let Some(source) = opts.source {
            pages.push(format!("Mode: {}", source));
        }
        if let Some(notes) = opts.notes.as_deref().filter(|n| !n.is_empty()) {
            pages.push(format!("Notes: {}", truncate_chars(notes, MAX_NOTES_CHARS)));
        }
        if let Some(summary) = opts.summary.as_deref().filter(|s| !s.is_empty()) {
            pages.push(format!(
                "Summary: {}",
                truncate_chars(summary, MAX_SUMMARY_CHARS)
            ));
        }

        pages.blank();
        pages.push("Cost Range".to_string());
        pages.push(format!(
            "{} {} - {}",
            result.currency,
            format_amount(result.min),
            format_amount(result.max)
        ));
        pages.push(format!(
            "Estimated Hours: {}  | Timeline: ~{} weeks",
            result.hours, result.timeline_weeks
        ));

        pages.blank();
        pages.push("Breakdown".to_string());
        for line in &result.breakdown {
            let amount = format!("{} {}", result.currency, format_amount(line.amount));
            pages.push(align_right(&line.label, &amount));
        }

        if opts.include_assumptions && !result.assumptions.is_empty() {
            pages.blank();
            pages.push("Assumptions".to_string());
            for assumption in &result.assumptions {
                pages.push(format!("- {}", assumption));
            }
        }

        if opts.include_suggestions && !result.suggestions.is_empty() {
            pages.blank();
            pages.push("Optimization Ideas".to_string());
            for suggestion in &result.suggestions {
                pages.push(format!("- {}", suggestion));
            }
        }

        pages.blank();
        pages.push(INVOICE_FOOTER.to_string());

        Self {
            pages: pages.finish(),
        }
    }

    /// Render as text, pages separated by form feeds
    pub fn render(&self) -> String {
        let pages: Vec<String> = self.pages.iter().map(|p| p.join("\n")).collect();
        let mut out = pages.join("\n\u{c}");
        out.push('\n');
        out
    }
}

struct PageWriter {
    lines_per_page: usize,
    pages: Vec<Vec<String>>,
    current: Vec<String>,
}

impl PageWriter {
    fn new(lines_per_page: usize) -> Self {
        Self {
            lines_per_page: lines_per_page.max(1),
            pages: Vec::new(),
            current: Vec::new(),
        }
    }

    fn push(&mut self, line: String) {
        if self.current.len() >= self.lines_per_page {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.current.push(line);
    }

    /// Section spacing; dropped at the top of a page
    fn blank(&mut self) {
        if !self.current.is_empty() && self.current.len() < self.lines_per_page {
            self.current.push(String::new());
        }
    }

    fn finish(mut self) -> Vec<Vec<String>> {
        if !self.current.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    label: &'a str,
    amount: i64,
}

/// Breakdown as CSV with a `label,amount` header
pub fn to_csv(result: &EstimateResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for line in &result.breakdown {
        writer.serialize(CsvRow {
            label: &line.label,
            amount: line.amount,
        })?;
    }
    if result.breakdown.is_empty() {
        writer.write_record(["label", "amount"])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::InvalidData(format!("Failed to finish CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(e.to_string()))
}

#[derive(Serialize)]
struct JsonExport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<EstimateSource>,
    estimate: &'a EstimateResult,
}

pub fn to_json(result: &EstimateResult, source: Option<EstimateSource>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonExport {
        source,
        estimate: result,
    })?)
}

/// `estimate_YYYY-MM-DD.<ext>`
pub fn default_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!("estimate_{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Whole-number amount with en-US thousands separators
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn align_right(label: &str, amount: &str) -> String {
    let used = label.chars().count() + amount.chars().count();
    let pad = INVOICE_WIDTH.saturating_sub(used).max(1);
    format!("{}{}{}", label, " ".repeat(pad), amount)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
