//! Configuration module with service-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection settings
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Passcode lifecycle settings (TTL, storage, verify limits)
//! - `providers` - SMS and email provider credentials
//! - `queue` - Notification queue backend
//! - `server` - HTTP server binding
//!
//! Everything is read once at process start and then treated as immutable.
//! The resulting [`AppConfig`] is passed by reference to constructors.

pub mod cache;
pub mod environment;
pub mod otp;
pub mod providers;
pub mod queue;
pub mod server;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::{OtpConfig, StoreBackend};
pub use providers::{
    BrevoSettings, EmailProviderKind, ProviderConfig, SendGridSettings, SmsProviderKind,
    TwilioSettings,
};
pub use queue::{QueueBackend, QueueConfig};
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Service name reported by the health endpoint
    pub app_name: String,

    /// Cloud project identifier (used to namespace the queue topic)
    pub project_id: String,

    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// OTP lifecycle configuration
    pub otp: OtpConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    /// Notification queue configuration
    pub queue: QueueConfig,

    /// Delivery provider configuration
    pub providers: ProviderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let environment = Environment::default();
        Self {
            app_name: String::from("NotificationService"),
            project_id: String::from("notification-service"),
            environment,
            server: ServerConfig::default(),
            otp: OtpConfig::default(),
            cache: CacheConfig::default(),
            queue: QueueConfig::default(),
            providers: ProviderConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Missing or malformed values fall back to their defaults.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            app_name: env_string("APP_NAME", "NotificationService"),
            project_id: env_string("PROJECT_ID", "notification-service"),
            environment,
            server: ServerConfig::from_env(),
            otp: OtpConfig::from_env(),
            cache: CacheConfig::from_env(),
            queue: QueueConfig::from_env(),
            providers: ProviderConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }
}

/// Read a string variable, falling back to `default` when unset
pub(crate) fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an optional variable; empty strings count as unset
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse a variable, falling back to `default` when unset or invalid
pub(crate) fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
