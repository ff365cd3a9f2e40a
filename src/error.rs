use std::path::PathBuf;

use thiserror::Error;

/// Failures at the ingestion boundary. Derivations themselves never fail.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot is not valid monitoring data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sync log CSV row {row} is invalid: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("failed to open sync log CSV: {0}")]
    CsvOpen(#[from] csv::Error),
}

/// Why a user intent was not forwarded to [`crate::actions::MonitorActions`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("no {kind} with id {id} in the current snapshot")]
    UnknownRecord { kind: &'static str, id: String },

    #[error("{role} may not {action}")]
    NotPermitted { role: &'static str, action: &'static str },

    #[error("{action} is not available while {id} is {status}")]
    InvalidState {
        id: String,
        action: &'static str,
        status: &'static str,
    },

    #[error("action {0} already has an operation running")]
    AlreadyRunning(String),

    #[error("nothing is awaiting confirmation")]
    NothingToConfirm,
}
