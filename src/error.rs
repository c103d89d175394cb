//! Crate-wide error taxonomy.
//!
//! Every variant here corresponds 1:1 to the error classes the core is
//! specified to distinguish: validation, not-found, permission, timeout,
//! queue-full, cancelled, rule, and the catch-all io/configuration buckets.
//! Callers match on the taxonomy rather than string content.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for SwiftSweep core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A path failed Path Validator checks. Per-item; never fatal.
    #[error("path validation failed for {path}: {reason}")]
    Validation { path: PathBuf, reason: String },

    /// A referenced path no longer exists.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The unprivileged process cannot perform the mutation.
    #[error("permission denied for {path}")]
    Permission { path: PathBuf },

    /// A scheduler-bounded operation exceeded its time budget.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Backpressure rejected admission.
    #[error("scheduler queue is full")]
    QueueFull,

    /// Cooperative cancellation was observed.
    #[error("operation cancelled")]
    Cancelled,

    /// A rule raised during evaluation; carries the offending rule's id.
    #[error("rule '{rule_id}' failed: {message}")]
    RuleError { rule_id: String, message: String },

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization of persisted state failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any lower-level filesystem error not matching the above.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Construct a validation error with path context.
    pub fn validation(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Construct a permission error with path context.
    pub fn permission(path: impl Into<PathBuf>) -> Self {
        Self::Permission { path: path.into() }
    }

    /// Construct a rule error with the offending rule's id.
    pub fn rule(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleError {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Classify this error into the coarse taxonomy used by per-item
    /// results: the tag is stable and safe to serialize.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Permission { .. } => ErrorKind::Permission,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::QueueFull => ErrorKind::QueueFull,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::RuleError { .. } => ErrorKind::RuleError,
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

/// Stable, serializable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Permission,
    Timeout,
    QueueFull,
    Cancelled,
    RuleError,
    Configuration,
    Serialization,
    Io,
}

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;
