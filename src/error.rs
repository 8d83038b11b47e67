//! Error types for FLOW operations
//!
//! Errors are classified by recoverability:
//! - Retryable: backend/transport problems the user may retry manually
//! - NonRetryable: bad input, missing records, configuration problems
//!
//! Nothing in this crate treats an error as fatal to the process; every
//! failure is scoped to the operation that raised it.

use thiserror::Error;

/// Error types for document and calendar operations
#[derive(Debug, Error)]
pub enum FlowError {
    // Retryable errors
    #[error("Backend error: {0}")]
    Backend(String),

    // Non-retryable errors
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Record is read-only: {0}")]
    ReadOnly(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl FlowError {
    /// Returns true if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FlowError::Backend(_))
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FlowError::Backend(_) => "The workspace backend did not respond. Try again.",
            FlowError::NotFound(_) => "The record no longer exists. Refresh and try again.",
            FlowError::InvalidInput(_) => "Check the entered values and try again.",
            FlowError::ReadOnly(_) => {
                "This entry is derived from a project and can only be changed on the project."
            }
            FlowError::Configuration(_) => "Check your configuration in ~/.flow/config.json",
            FlowError::Serialization(_) => "The record format is unexpected. Refresh and try again.",
            FlowError::Io(_) => "Check file permissions and disk space.",
        }
    }
}

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Serialization(err.to_string())
    }
}

/// Serializable error representation for IPC.
///
/// Write failures surface to the user as an inline message; the UI leaves
/// its loading state and the user decides whether to retry.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Retryable,
    NonRetryable,
}

impl From<&FlowError> for SurfaceError {
    fn from(err: &FlowError) -> Self {
        let error_type = if err.is_retryable() {
            ErrorType::Retryable
        } else {
            ErrorType::NonRetryable
        };

        SurfaceError {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
