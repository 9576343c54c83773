//! Configuration for the OTP service

use chrono::Duration;
use ns_shared::config::OtpConfig;

use crate::domain::entities::otp_record::{DEFAULT_CODE_LENGTH, DEFAULT_TTL_MINUTES};

/// Configuration for the OTP service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Validity window of an issued passcode
    pub ttl: Duration,
    /// Number of digits per passcode
    pub code_length: usize,
    /// Bound applied to every store and limiter call
    pub store_timeout: std::time::Duration,
    /// Extra attempts for `issue` after a store failure
    pub issue_retries: u32,
    /// Pause between issue attempts
    pub issue_retry_delay: std::time::Duration,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
            code_length: DEFAULT_CODE_LENGTH,
            store_timeout: std::time::Duration::from_secs(2),
            issue_retries: 2,
            issue_retry_delay: std::time::Duration::from_millis(100),
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            ttl: Duration::minutes(config.effective_ttl_minutes()),
            code_length: config.code_length,
            store_timeout: std::time::Duration::from_millis(config.store_timeout_ms),
            issue_retries: config.issue_retries,
            issue_retry_delay: std::time::Duration::from_millis(config.issue_retry_delay_ms),
        }
    }
}
