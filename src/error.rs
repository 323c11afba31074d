use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read run directory {}: {source}", .path.display())]
    RunDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A run's metadata file is missing or malformed. Aborts the whole report.
    #[error("corrupt run record {}: {reason}", .path.display())]
    CorruptRunRecord { path: PathBuf, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
