//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CasebookError, Result};

pub const DEFAULT_NOTIFY_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log_path: Option<PathBuf>,
    pub log_json: bool,
    pub write_log: Option<PathBuf>,
    pub notify_after: Duration,
    pub mouse: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_json: false,
            write_log: None,
            notify_after: Duration::from_millis(DEFAULT_NOTIFY_MS),
            mouse: true,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_path: env_path_opt("CASEBOOK_LOG"),
            log_json: env_flag("CASEBOOK_LOG_JSON"),
            write_log: env_path_opt("CASEBOOK_WRITE_LOG"),
            notify_after: Duration::from_millis(env_millis(
                "CASEBOOK_NOTIFY_MS",
                DEFAULT_NOTIFY_MS,
            )?),
            mouse: env::var("CASEBOOK_MOUSE").map(|value| value != "0").unwrap_or(true),
        })
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_path_opt(key: &str) -> Option<PathBuf> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(value))
        }
    })
}

fn env_millis(key: &'static str, default: u64) -> Result<u64> {
    let Ok(value) = env::var(key) else {
        return Ok(default);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    match trimmed.parse::<u64>() {
        Ok(0) => Err(CasebookError::InvalidConfig {
            key,
            value,
            reason: "must be greater than zero",
        }),
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(CasebookError::InvalidConfig {
            key,
            value,
            reason: "expected a whole number of milliseconds",
        }),
    }
}
