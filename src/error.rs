//! Error types for the reporting pipeline
//!
//! Recoverable conditions (unmapped phases, units without output, a missing upload
//! URL) never surface here. Only structural failures do, and they abort the session.

use crate::config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or submitting CDash reports
#[derive(Debug, Error)]
pub enum ReportError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// The HTTP PUT to the dashboard failed or returned a non-success status
    #[error("Upload to {url} failed: {source}")]
    Upload { url: String, source: reqwest::Error },

    /// The configured upload URL could not be parsed
    #[error("Invalid upload URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Configuration was rejected before the session started
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input records could not be decoded
    #[error("Invalid report input: {0}")]
    Input(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ReportError>;
