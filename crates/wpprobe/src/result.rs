//! Result and error types for wpprobe.
//!
//! Nothing is recovered locally: every variant propagates to the enclosing
//! scenario step, which records it as the step failure.

use thiserror::Error;

/// Result type for wpprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Required configuration value is absent
    #[error("Precondition failed: {message}")]
    Precondition {
        /// Error message
        message: String,
    },

    /// Locator resolved to zero elements within the wait budget
    #[error("Element not found: {locator} (waited {timeout_ms}ms)")]
    ElementNotFound {
        /// Description of the locator
        locator: String,
        /// Wait budget in milliseconds
        timeout_ms: u64,
    },

    /// A load-state, URL or element-state wait exceeded its budget
    #[error("Timed out after {timeout_ms}ms waiting for {condition}")]
    NavigationTimeout {
        /// What was being waited for
        condition: String,
        /// Wait budget in milliseconds
        timeout_ms: u64,
    },

    /// Observed value did not match the expectation
    #[error("Assertion failed: {message} (expected {expected:?}, got {actual:?})")]
    AssertionFailed {
        /// Error message
        message: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// Arithmetic mismatch in the price reconciliation
    #[error("{}", reconciliation_message(.row, .calculated, .displayed))]
    Reconciliation {
        /// Zero-based row index, `None` for the grand total
        row: Option<usize>,
        /// Value computed from the rendered parts
        calculated: u64,
        /// Value rendered on the page
        displayed: u64,
    },

    /// Browser executable could not be started
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Driver-level failure (script error, closed page, ...)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Configuration source could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

fn reconciliation_message(row: &Option<usize>, calculated: &u64, displayed: &u64) -> String {
    match row {
        Some(index) => format!(
            "Calculated subtotal ({calculated}) does not match displayed ({displayed}) for product {}",
            index + 1
        ),
        None => format!("Calculated total ({calculated}) does not match displayed total ({displayed})"),
    }
}

impl ProbeError {
    /// Create a precondition error
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create an assertion error carrying both sides of the comparison
    #[must_use]
    pub fn assertion(
        message: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::AssertionFailed {
            message: message.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Short stable label for reports
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Precondition { .. } => "precondition",
            Self::ElementNotFound { .. } => "element-not-found",
            Self::NavigationTimeout { .. } => "navigation-timeout",
            Self::AssertionFailed { .. } => "assertion",
            Self::Reconciliation { .. } => "reconciliation",
            Self::BrowserLaunch { .. } => "browser-launch",
            Self::Driver { .. } => "driver",
            Self::Config { .. } => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Yaml(_) => "yaml",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_reconciliation_message_is_one_based() {
        let err = ProbeError::Reconciliation {
            row: Some(1),
            calculated: 24000,
            displayed: 23000,
        };
        assert_eq!(
            err.to_string(),
            "Calculated subtotal (24000) does not match displayed (23000) for product 2"
        );
    }

    #[test]
    fn test_total_reconciliation_message() {
        let err = ProbeError::Reconciliation {
            row: None,
            calculated: 100,
            displayed: 90,
        };
        assert!(err.to_string().contains("displayed total (90)"));
    }

    #[test]
    fn test_assertion_carries_both_values() {
        let err = ProbeError::assertion("order status", "Completed", "Processing");
        match &err {
            ProbeError::AssertionFailed {
                expected, actual, ..
            } => {
                assert_eq!(expected, "Completed");
                assert_eq!(actual, "Processing");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(err.kind(), "assertion");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ProbeError = io.into();
        assert_eq!(err.kind(), "io");
    }
}
