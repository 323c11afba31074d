use indexmap::IndexMap;
use serde::Serialize;

use crate::stats::{max, mean, median, ratio};
use crate::store::RunRecord;

/// Runs grouped by hyperparameter configuration, then by program, in first-seen order.
pub type RunGroups<'a> = IndexMap<&'a str, IndexMap<&'a str, Vec<&'a RunRecord>>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellStats {
    pub mean_satisfaction: f64,
    pub median_satisfaction: f64,
    pub max_satisfaction: f64,
    pub mean_run_length: f64,
    pub median_run_length: f64,
    pub timeout_rate: f64,
    pub non_null_satisfaction: Vec<f64>,
    pub sample_count: usize,
}

impl CellStats {
    /// Records with no `satisfaction` key are skipped entirely.
    pub fn from_runs<'a, I>(runs: I) -> Self
    where
        I: IntoIterator<Item = &'a RunRecord>,
    {
        let mut satisfactions = Vec::new();
        let mut run_lengths = Vec::new();
        let mut non_null_satisfaction = Vec::new();
        let mut timeouts = 0usize;

        for run in runs {
            let Some(satisfaction) = run.satisfaction.value() else {
                continue;
            };
            satisfactions.push(satisfaction);
            if let Some(codelets_run) = run.codelets_run {
                run_lengths.push(codelets_run);
            }
            if run.output.is_timeout() {
                timeouts += 1;
            } else {
                non_null_satisfaction.push(satisfaction);
            }
        }

        Self {
            mean_satisfaction: mean(&satisfactions),
            median_satisfaction: median(&satisfactions),
            max_satisfaction: max(&satisfactions),
            mean_run_length: mean(&run_lengths),
            median_run_length: median(&run_lengths),
            timeout_rate: ratio(timeouts, satisfactions.len()),
            non_null_satisfaction,
            sample_count: satisfactions.len(),
        }
    }
}

/// Per-program statistics for every hyperparameter configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HyperparamTable {
    configs: IndexMap<String, IndexMap<String, CellStats>>,
}

impl HyperparamTable {
    pub fn from_runs(runs: &[RunRecord]) -> Self {
        let configs = group_runs(runs)
            .into_iter()
            .map(|(hyperparams, programs)| {
                let cells = programs
                    .into_iter()
                    .map(|(program, runs)| (program.to_string(), CellStats::from_runs(runs)))
                    .collect();
                (hyperparams.to_string(), cells)
            })
            .collect();
        Self { configs }
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn cell(&self, hyperparams_id: &str, program_id: &str) -> Option<&CellStats> {
        self.configs.get(hyperparams_id)?.get(program_id)
    }

    pub fn programs(&self, hyperparams_id: &str) -> Option<&IndexMap<String, CellStats>> {
        self.configs.get(hyperparams_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, CellStats>)> {
        self.configs
            .iter()
            .map(|(hyperparams, cells)| (hyperparams.as_str(), cells))
    }
}

pub fn group_runs(runs: &[RunRecord]) -> RunGroups<'_> {
    let mut groups: RunGroups<'_> = IndexMap::new();
    for run in runs {
        groups
            .entry(run.hyperparams_id.as_str())
            .or_default()
            .entry(run.program_id.as_str())
            .or_default()
            .push(run);
    }
    groups
}
