pub mod aggregate;
pub mod config;
pub mod error;
pub mod report;
pub mod stats;
pub mod store;
pub mod summary;

use std::collections::HashMap;

pub use crate::aggregate::{group_runs, CellStats, HyperparamTable};
pub use crate::config::{LogsConfig, ReportConfig};
pub use crate::error::{Error, Result};
pub use crate::report::{format_stat, render, render_json, render_tsv, ReportFormat};
pub use crate::store::{CorpusStats, RunOutput, RunRecord, RunStore, Satisfaction};
pub use crate::summary::{summarize, HyperparamSummary};

/// Reports that can be requested by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    HyperParameterComparison,
}

impl ReportKind {
    pub const ALL: [ReportKind; 1] = [ReportKind::HyperParameterComparison];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim_end_matches(".js") {
            "hyper_parameter_comparison" => Some(ReportKind::HyperParameterComparison),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReportKind::HyperParameterComparison => "hyper_parameter_comparison",
        }
    }

    pub fn run(self, query: &HashMap<String, String>, config: &ReportConfig) -> Result<String> {
        match self {
            ReportKind::HyperParameterComparison => run(query, config),
        }
    }
}

/// Reads every run under the configured logs root and rolls them up per configuration.
pub fn compute_summaries(
    query: &HashMap<String, String>,
    config: &ReportConfig,
) -> Result<Vec<HyperparamSummary>> {
    if !query.is_empty() {
        tracing::debug!(?query, "query parameters are not used by this report");
    }

    let store = RunStore::from_config(&config.logs);
    let corpus_stats = store.corpus_stats();
    let runs = store.load_runs()?;
    let table = HyperparamTable::from_runs(&runs);
    let summaries = summarize(&table);

    tracing::info!(
        root = %store.root().display(),
        runs = runs.len(),
        configurations = summaries.len(),
        corpus_stats = corpus_stats.len(),
        "computed hyperparameter summaries"
    );

    Ok(summaries)
}

/// Hyperparameter comparison report as tab-separated text.
pub fn run(query: &HashMap<String, String>, config: &ReportConfig) -> Result<String> {
    let summaries = compute_summaries(query, config)?;
    Ok(render_tsv(&summaries))
}
