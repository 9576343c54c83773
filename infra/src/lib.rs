//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer of the notification
//! service, following Clean Architecture principles. It provides concrete
//! implementations of the storage, queue and provider contracts defined in
//! `ns_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis client, Redis-backed OTP store and verify limiter
//! - **Queue**: In-process channel queue and Redis list queue
//! - **Providers**: Twilio SMS, SendGrid and Brevo email, logging mock

// Re-export core types for convenience
pub use ns_core::errors::*;

/// Cache module - Redis client, OTP store and verify limiter
pub mod cache;

/// Queue module - notification queue implementations
pub mod queue;

/// Providers module - SMS and email delivery adapters
pub mod providers;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Serialization(e) => StoreError::Corrupt(e.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

impl From<InfrastructureError> for QueueError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Serialization(e) => QueueError::Encode(e.to_string()),
            other => QueueError::Unavailable(other.to_string()),
        }
    }
}
