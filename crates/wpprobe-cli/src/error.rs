//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Required settings are absent
    #[error("Missing settings for suite '{suite}': {}", missing.join(", "))]
    MissingSettings {
        /// Suite name
        suite: String,
        /// Variable names
        missing: Vec<String>,
    },

    /// At least one step failed
    #[error("Suite '{suite}' failed: {failed} step(s) failed, {skipped} skipped")]
    SuiteFailed {
        /// Suite name
        suite: String,
        /// Failed step count
        failed: usize,
        /// Skipped step count
        skipped: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// wpprobe library error
    #[error("wpprobe error: {0}")]
    Probe(#[from] wpprobe::ProbeError),

    /// Report serialization error
    #[error("Report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
