//! File-backed tracing setup.
//!
//! The board UI owns the terminal, so log output never goes to stdout or
//! stderr. Everything is appended to a log file instead.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, AppResult};

pub const ENV_STATION_LOG: &str = "STATION_LOG";
const DEFAULT_FILTER: &str = "project_station=info,warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_STATION_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, appending to `log_path`.
pub fn init_tracing(log_path: &Path) -> AppResult<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|error| {
                AppError::Logging(format!(
                    "failed to create log directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|error| {
            AppError::Logging(format!(
                "failed to open log file '{}': {error}",
                log_path.display()
            ))
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))
}
