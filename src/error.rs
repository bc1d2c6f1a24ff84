//! Error types.
//!
//! `RemoteError` is the only failure the interactive components ever see: a
//! remote call either succeeded or it did not, and the detail is kept for the
//! log only. `AppError` covers everything that can stop the binary itself.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A failed remote call (network, status or decoding failure).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("remote call failed: {detail}")]
pub struct RemoteError {
    detail: String,
}

impl RemoteError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }

    /// Diagnostic detail for logging.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        Self::new(error.to_string())
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read config file '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("{0}")]
    Usage(String),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
