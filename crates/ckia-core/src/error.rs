//! Error types for ckia

use crate::report::FailureKind;
use thiserror::Error;

/// Main error type for ckia operations
#[derive(Error, Debug)]
pub enum CkiaError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with context
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// Configuration error (bad output format, malformed filters, miswired catalogue)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider session could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// A check identifier was registered twice
    #[error("Duplicate check identifier: {0}")]
    DuplicateIdentifier(String),

    /// No check is registered under this identifier
    #[error("Unknown check identifier: {0}")]
    UnknownIdentifier(String),

    /// The check exists but does not expose the requested operation
    #[error("Unknown operation '{operation}' for check {id}")]
    UnknownOperation { id: String, operation: String },

    /// The supplied arguments do not match the operation's arity
    #[error("Operation '{operation}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        got: usize,
    },

    /// A provider API call failed
    #[error("{service} API error: {message}")]
    Provider { service: String, message: String },

    /// The run deadline passed
    #[error("Deadline exceeded after {0:?}")]
    Timeout(std::time::Duration),

    /// The run was cancelled
    #[error("Run cancelled")]
    Cancelled,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl CkiaError {
    /// Shorthand for a provider API failure
    pub fn provider(service: impl Into<String>, message: impl Into<String>) -> Self {
        CkiaError::Provider {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts a whole run rather than a single check
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(
            self,
            CkiaError::Config(_)
                | CkiaError::Connection(_)
                | CkiaError::Serialization(_)
                | CkiaError::Io(_)
                | CkiaError::Parse { .. }
        )
    }

    /// Classification used when the error is recorded against a single check
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            CkiaError::UnknownIdentifier(_)
            | CkiaError::UnknownOperation { .. }
            | CkiaError::ArityMismatch { .. }
            | CkiaError::DuplicateIdentifier(_) => FailureKind::Dispatch,
            CkiaError::Provider { .. } | CkiaError::Connection(_) => FailureKind::Provider,
            CkiaError::Timeout(_) => FailureKind::Timeout,
            CkiaError::Cancelled => FailureKind::Cancelled,
            _ => FailureKind::Internal,
        }
    }
}

impl From<serde_json::Error> for CkiaError {
    fn from(err: serde_json::Error) -> Self {
        CkiaError::Serialization(err.to_string())
    }
}

/// Result type alias for ckia operations
pub type Result<T> = std::result::Result<T, CkiaError>;
