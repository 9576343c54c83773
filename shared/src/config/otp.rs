//! One-time passcode lifecycle configuration

use serde::{Deserialize, Serialize};

use super::{env_parse, env_string};

/// Longest passcode validity accepted from configuration (one day)
pub const MAX_TTL_MINUTES: i64 = 1440;

/// Backing technology for the OTP store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map; records are lost on restart
    Memory,
    /// Shared Redis instance
    Redis,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            _ => Err(format!("Invalid OTP store backend: {}", s)),
        }
    }
}

/// OTP lifecycle settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Minutes a passcode stays valid after issuance, within `1..=MAX_TTL_MINUTES`
    pub ttl_minutes: i64,

    /// Number of digits in a generated passcode
    pub code_length: usize,

    /// Storage collection (key namespace) holding passcode records
    pub collection: String,

    /// Store backend selection
    pub backend: StoreBackend,

    /// Upper bound for a single store operation, in milliseconds
    pub store_timeout_ms: u64,

    /// Extra attempts made by `issue` when the store is unavailable
    pub issue_retries: u32,

    /// Delay between `issue` retries, in milliseconds
    pub issue_retry_delay_ms: u64,

    /// Verification attempts allowed per identifier within one window
    pub max_verify_attempts: u32,

    /// Length of the verify-attempt window, in seconds
    pub verify_window_seconds: u64,

    /// Interval of the background expiry sweep, in seconds (0 disables it)
    pub sweep_interval_seconds: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 5,
            code_length: 6,
            collection: String::from("otps"),
            backend: StoreBackend::Memory,
            store_timeout_ms: 2000,
            issue_retries: 2,
            issue_retry_delay_ms: 100,
            max_verify_attempts: 5,
            verify_window_seconds: 300,
            sweep_interval_seconds: 60,
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_minutes: env_parse("OTP_TTL_MINUTES", defaults.ttl_minutes)
                .clamp(1, MAX_TTL_MINUTES),
            code_length: env_parse("OTP_CODE_LENGTH", defaults.code_length).clamp(4, 10),
            collection: env_string("OTP_COLLECTION", &defaults.collection),
            backend: env_parse("OTP_STORE_BACKEND", defaults.backend),
            store_timeout_ms: env_parse("OTP_STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            issue_retries: env_parse("OTP_ISSUE_RETRIES", defaults.issue_retries),
            issue_retry_delay_ms: env_parse("OTP_ISSUE_RETRY_DELAY_MS", defaults.issue_retry_delay_ms),
            max_verify_attempts: env_parse("OTP_MAX_VERIFY_ATTEMPTS", defaults.max_verify_attempts)
                .max(1),
            verify_window_seconds: env_parse(
                "OTP_VERIFY_WINDOW_SECONDS",
                defaults.verify_window_seconds,
            ),
            sweep_interval_seconds: env_parse(
                "OTP_SWEEP_INTERVAL_SECONDS",
                defaults.sweep_interval_seconds,
            ),
        }
    }

    /// TTL in minutes, clamped to `1..=MAX_TTL_MINUTES`
    pub fn effective_ttl_minutes(&self) -> i64 {
        self.ttl_minutes.clamp(1, MAX_TTL_MINUTES)
    }

    /// TTL expressed in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.effective_ttl_minutes() * 60
    }
}
