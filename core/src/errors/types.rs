//! Error types raised by validation, storage and queue collaborators

use thiserror::Error;

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field} ({reason})")]
    InvalidFormat { field: String, reason: String },

    #[error("Invalid length: {field} (expected: {expected}, actual: {actual})")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::RequiredField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::RequiredField { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::InvalidLength { field, .. } => field,
        }
    }
}

/// Failures of an OTP store or verify-attempt limiter backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend unreachable or returned an error
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Operation exceeded the configured store timeout
    #[error("store operation timed out")]
    Timeout,

    /// Stored data could not be decoded
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Failures of the notification queue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue unavailable: {0}")]
    Unavailable(String),

    /// Consumer side has gone away
    #[error("queue closed")]
    Closed,

    #[error("message could not be encoded: {0}")]
    Encode(String),

    #[error("message could not be decoded: {0}")]
    Decode(String),
}
