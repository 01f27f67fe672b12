use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CasebookError {
    #[error("I/O error while {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log sink at {path}: {source}")]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install log subscriber: {message}")]
    LogInit { message: String },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidConfig {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl CasebookError {
    pub fn io(operation: &'static str, source: std::io::Error) -> Self {
        Self::Io { operation, source }
    }
}

pub type Result<T, E = CasebookError> = std::result::Result<T, E>;
