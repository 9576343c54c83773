//! Cache module for Redis-backed state
//!
//! This module provides the Redis client and the Redis implementations of
//! the OTP store and the verify-attempt limiter.

pub mod otp_store;
pub mod rate_limiter;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use otp_store::RedisOtpStore;
pub use rate_limiter::RedisVerifyRateLimiter;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use ns_shared::config::CacheConfig;
