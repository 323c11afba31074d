use std::fmt::Write;

use crate::error::Result;
use crate::summary::HyperparamSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Tsv,
    Json,
}

impl ReportFormat {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "tsv" | "text" => Some(ReportFormat::Tsv),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

pub fn render(summaries: &[HyperparamSummary], format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Tsv => Ok(render_tsv(summaries)),
        ReportFormat::Json => render_json(summaries),
    }
}

/// One line per configuration: the id verbatim, then ten tab-separated numbers.
pub fn render_tsv(summaries: &[HyperparamSummary]) -> String {
    let mut doc = String::new();
    for summary in summaries {
        doc.push_str(&summary.hyperparams_id);
        for value in summary.fields() {
            let _ = write!(doc, "\t{}", format_stat(value));
        }
        doc.push('\n');
    }
    doc
}

/// NaN fields serialize as `null`.
pub fn render_json(summaries: &[HyperparamSummary]) -> Result<String> {
    Ok(serde_json::to_string_pretty(summaries)?)
}

/// Shortest decimal that round-trips, with `NaN` for undefined statistics.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    format!("{}", value)
}
