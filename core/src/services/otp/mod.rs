//! OTP lifecycle module
//!
//! This module provides the one-time passcode workflow:
//! - Cryptographically secure passcode generation
//! - A storage contract with an atomic check-and-consume operation
//! - Issue and verify orchestration with timeouts and issue retries
//! - Per-identifier limits on verification attempts
//! - Rejection-reason metrics that never reach the caller

mod config;
mod generator;
mod limiter;
mod memory_store;
mod metrics;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::OtpServiceConfig;
pub use generator::PasscodeGenerator;
pub use limiter::{InMemoryVerifyRateLimiter, RateLimitPolicy};
pub use memory_store::InMemoryOtpStore;
pub use metrics::{OtpMetrics, OtpMetricsSnapshot};
pub use service::{otp_notification, OtpService};
pub use traits::{OtpStoreTrait, VerifyRateLimiterTrait};
pub use types::{ConsumeOutcome, IssuedOtp, RateLimitStatus, RejectionReason};
