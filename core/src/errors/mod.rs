//! Domain-specific error types and error handling.

mod types;


// Re-export all error types
pub use types::{QueueError, StoreError, ValidationError};

use thiserror::Error;

/// Core domain errors
///
/// An OTP that does not verify is not an error: `verify` returns `Ok(false)`.
/// Only conditions the caller must handle differently end up here.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed input, rejected before any backend is touched
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The OTP store could not be reached or answered too slowly
    #[error("OTP store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Too many verification attempts for one identifier
    #[error("Too many verification attempts, retry in {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    /// The notification could not be placed on the queue
    #[error("Failed to queue notification: {message}")]
    QueueUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::StoreUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<QueueError> for DomainError {
    fn from(err: QueueError) -> Self {
        DomainError::QueueUnavailable {
            message: err.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
