use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};

use crate::config::LogsConfig;
use crate::error::{Error, Result};

/// What a run reported under `result`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RunOutput {
    Completed(Value),
    /// Explicit `null`: the run did not finish in time.
    TimedOut,
    /// No `result` key at all. Not counted as a timeout.
    #[default]
    Unreported,
}

impl RunOutput {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunOutput::TimedOut)
    }
}

fn deserialize_output<'de, D>(deserializer: D) -> std::result::Result<RunOutput, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value) => RunOutput::Completed(value),
        None => RunOutput::TimedOut,
    })
}

/// The `satisfaction` key, keeping an explicit `null` apart from a missing key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Satisfaction {
    Scored(f64),
    /// Present but `null`. The run stays in its group with a NaN score.
    Null,
    /// No `satisfaction` key. The run is left out of every statistic.
    #[default]
    Absent,
}

impl Satisfaction {
    /// The score a run contributes, `None` when it contributes nothing.
    pub fn value(self) -> Option<f64> {
        match self {
            Satisfaction::Scored(value) => Some(value),
            Satisfaction::Null => Some(f64::NAN),
            Satisfaction::Absent => None,
        }
    }

    pub fn is_present(self) -> bool {
        !matches!(self, Satisfaction::Absent)
    }
}

fn deserialize_satisfaction<'de, D>(deserializer: D) -> std::result::Result<Satisfaction, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<f64>::deserialize(deserializer)? {
        Some(value) => Satisfaction::Scored(value),
        None => Satisfaction::Null,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunRecord {
    #[serde(rename = "hyper_parameters")]
    pub hyperparams_id: String,
    #[serde(rename = "Program")]
    pub program_id: String,
    #[serde(rename = "result", default, deserialize_with = "deserialize_output")]
    pub output: RunOutput,
    #[serde(default, deserialize_with = "deserialize_satisfaction")]
    pub satisfaction: Satisfaction,
    #[serde(default)]
    pub codelets_run: Option<f64>,
    #[serde(rename = "random_seed", default)]
    pub seed: Option<Number>,
}

impl RunRecord {
    pub fn new(hyperparams_id: impl Into<String>, program_id: impl Into<String>) -> Self {
        Self {
            hyperparams_id: hyperparams_id.into(),
            program_id: program_id.into(),
            output: RunOutput::Unreported,
            satisfaction: Satisfaction::Absent,
            codelets_run: None,
            seed: None,
        }
    }

    pub fn from_json(data: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

/// Whole-corpus statistics written next to the run directories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusStats(pub Map<String, Value>);

impl CorpusStats {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
    details_file: String,
    corpus_stats_file: String,
    reserved_entries: Vec<String>,
}

impl RunStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(&LogsConfig {
            root: root.into(),
            ..LogsConfig::default()
        })
    }

    pub fn from_config(config: &LogsConfig) -> Self {
        Self {
            root: config.root.clone(),
            details_file: config.details_file.clone(),
            corpus_stats_file: config.corpus_stats_file.clone(),
            reserved_entries: config.reserved_entries.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        name == self.corpus_stats_file || self.reserved_entries.iter().any(|entry| entry == name)
    }

    /// Best effort: a missing or unparsable stats file yields an empty aggregate.
    pub fn corpus_stats(&self) -> CorpusStats {
        let path = self.root.join(&self.corpus_stats_file);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "no corpus stats");
                return CorpusStats::default();
            }
        };
        match serde_json::from_str::<Map<String, Value>>(&data) {
            Ok(map) => CorpusStats(map),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable corpus stats");
                CorpusStats::default()
            }
        }
    }

    /// Every non-reserved child of the root, ordered by file name.
    pub fn run_dirs(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| Error::RunDirectory {
            path: self.root.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::RunDirectory {
                path: self.root.clone(),
                source,
            })?;
            let name = entry.file_name();
            if self.is_reserved(&name.to_string_lossy()) {
                continue;
            }
            names.push(name);
        }
        names.sort();

        Ok(names.into_iter().map(|name| self.root.join(name)).collect())
    }

    pub fn load_run(&self, run_dir: &Path) -> Result<RunRecord> {
        let path = run_dir.join(&self.details_file);
        let data = std::fs::read_to_string(&path).map_err(|err| Error::CorruptRunRecord {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        RunRecord::from_json(&data).map_err(|err| Error::CorruptRunRecord {
            path,
            reason: err.to_string(),
        })
    }

    pub fn load_runs(&self) -> Result<Vec<RunRecord>> {
        let run_dirs = self.run_dirs()?;
        let mut records = Vec::with_capacity(run_dirs.len());
        for run_dir in &run_dirs {
            let record = self.load_run(run_dir)?;
            tracing::debug!(
                run = %run_dir.display(),
                hyperparams = %record.hyperparams_id,
                program = %record.program_id,
                "loaded run"
            );
            records.push(record);
        }
        Ok(records)
    }
}
