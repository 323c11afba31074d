use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub root: PathBuf,
    pub details_file: String,
    pub corpus_stats_file: String,
    /// Top-level entries that hold whole-corpus data rather than a run.
    pub reserved_entries: Vec<String>,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("logs"),
            details_file: "details.txt".to_string(),
            corpus_stats_file: "stats.txt".to_string(),
            reserved_entries: vec![
                "stats.txt".to_string(),
                "stats1.txt".to_string(),
                "texts.csv".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub logs: LogsConfig,
}

impl ReportConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| Error::Config(format!("failed to read config: {}", err)))?;
                Self::from_toml(&contents)?
            }
            _ => ReportConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|err| Error::Config(format!("failed to parse config: {}", err)))
    }

    pub fn with_logs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.logs.root = root.into();
        self
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(root) = env::var("REPORT_LOGS_DIR") {
            if !root.trim().is_empty() {
                self.logs.root = PathBuf::from(root);
            }
        }
        if let Ok(details_file) = env::var("REPORT_DETAILS_FILE") {
            if !details_file.trim().is_empty() {
                self.logs.details_file = details_file;
            }
        }
        if let Ok(stats_file) = env::var("REPORT_CORPUS_STATS_FILE") {
            if !stats_file.trim().is_empty() {
                self.logs.corpus_stats_file = stats_file;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("REPORT_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/report.toml")))
}
