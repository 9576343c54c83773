//! Shared utilities and common types for the notification service
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded once from the environment
//! - Response envelope structures
//! - Utility functions (identifier masking, recipient format checks)

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, EmailProviderKind, Environment, LogFormat, LoggingConfig,
    OtpConfig, ProviderConfig, QueueBackend, QueueConfig, ServerConfig, SmsProviderKind,
    StoreBackend,
};
pub use types::{ApiResponse, ErrorResponse};
pub use utils::{masking, validation};
