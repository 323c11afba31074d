use serde::Serialize;

use crate::aggregate::HyperparamTable;
use crate::stats::{mean, median};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HyperparamSummary {
    pub hyperparams_id: String,
    pub mean_satisfaction: f64,
    pub median_satisfaction: f64,
    pub mean_max_satisfaction: f64,
    pub median_max_satisfaction: f64,
    pub mean_run_length: f64,
    pub median_run_length: f64,
    pub mean_timeout_rate: f64,
    pub median_timeout_rate: f64,
    pub mean_non_null_satisfaction: f64,
    pub median_non_null_satisfaction: f64,
    pub program_count: usize,
}

impl HyperparamSummary {
    /// Report columns after the identifier, in output order.
    pub fn fields(&self) -> [f64; 10] {
        [
            self.mean_satisfaction,
            self.median_satisfaction,
            self.mean_max_satisfaction,
            self.median_max_satisfaction,
            self.mean_run_length,
            self.median_run_length,
            self.mean_timeout_rate,
            self.median_timeout_rate,
            self.mean_non_null_satisfaction,
            self.median_non_null_satisfaction,
        ]
    }
}

/// Rolls per-program cells up into one row per configuration.
///
/// Every field except the two `non_null` ones averages one value per program, so
/// each program counts equally. The `non_null` fields pool the raw satisfaction
/// values of all programs first, so programs with more completed runs weigh more.
pub fn summarize(table: &HyperparamTable) -> Vec<HyperparamSummary> {
    table
        .iter()
        .map(|(hyperparams_id, cells)| {
            let mut mean_satisfactions = Vec::with_capacity(cells.len());
            let mut median_satisfactions = Vec::with_capacity(cells.len());
            let mut max_satisfactions = Vec::with_capacity(cells.len());
            let mut mean_run_lengths = Vec::with_capacity(cells.len());
            let mut median_run_lengths = Vec::with_capacity(cells.len());
            let mut timeout_rates = Vec::with_capacity(cells.len());
            let mut pooled = Vec::new();

            for cell in cells.values() {
                mean_satisfactions.push(cell.mean_satisfaction);
                median_satisfactions.push(cell.median_satisfaction);
                max_satisfactions.push(cell.max_satisfaction);
                mean_run_lengths.push(cell.mean_run_length);
                median_run_lengths.push(cell.median_run_length);
                timeout_rates.push(cell.timeout_rate);
                pooled.extend_from_slice(&cell.non_null_satisfaction);
            }

            tracing::debug!(
                hyperparams = %hyperparams_id,
                pooled = ?pooled,
                "pooled non-null satisfaction"
            );

            HyperparamSummary {
                hyperparams_id: hyperparams_id.to_string(),
                mean_satisfaction: mean(&mean_satisfactions),
                median_satisfaction: median(&median_satisfactions),
                mean_max_satisfaction: mean(&max_satisfactions),
                median_max_satisfaction: median(&max_satisfactions),
                mean_run_length: mean(&mean_run_lengths),
                median_run_length: median(&median_run_lengths),
                mean_timeout_rate: mean(&timeout_rates),
                median_timeout_rate: median(&timeout_rates),
                mean_non_null_satisfaction: mean(&pooled),
                median_non_null_satisfaction: median(&pooled),
                program_count: cells.len(),
            }
        })
        .collect()
}
