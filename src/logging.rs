//! Log sink setup.
//!
//! The terminal is owned by the renderer while the runtime is active, so log
//! output goes to a file (`CASEBOOK_LOG`) or nowhere.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;
use crate::error::{CasebookError, Result};

pub const DEFAULT_LOG_FILTER: &str = "casebook=info,test_manager=info";

/// Install the global subscriber described by `config`.
///
/// Returns `Ok(false)` when no log path is configured.
pub fn init_logging(config: &EnvConfig) -> Result<bool> {
    let Some(path) = config.log_path.as_deref() else {
        return Ok(false);
    };
    let file = open_log_file(path)?;
    let env_filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    );
    let writer = Mutex::new(file);

    let result = if config.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .try_init()
    };

    result.map_err(|err| CasebookError::LogInit {
        message: err.to_string(),
    })?;
    Ok(true)
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| CasebookError::LogSink {
            path: path.to_path_buf(),
            source,
        })
}
