//! Fixed-window limiter for verification attempts

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::errors::StoreError;

use super::traits::VerifyRateLimiterTrait;
use super::types::RateLimitStatus;

/// Attempts allowed per identifier within one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(300),
        }
    }
}

impl RateLimitPolicy {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
        }
    }

    /// Build the status for the `attempts`-th attempt of a window
    pub fn status(&self, attempts: u32, retry_after: Duration) -> RateLimitStatus {
        RateLimitStatus {
            allowed: attempts <= self.max_attempts,
            attempts,
            remaining: self.max_attempts.saturating_sub(attempts),
            retry_after_seconds: retry_after.as_secs().max(1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    attempts: u32,
}

/// Process-local verify limiter
#[derive(Debug)]
pub struct InMemoryVerifyRateLimiter {
    policy: RateLimitPolicy,
    windows: DashMap<String, Window>,
}

impl InMemoryVerifyRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            windows: DashMap::new(),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Drop windows that have already elapsed
    pub fn purge_stale(&self) -> usize {
        let window = self.policy.window;
        let before = self.windows.len();
        self.windows
            .retain(|_, entry| entry.started_at.elapsed() < window);
        before.saturating_sub(self.windows.len())
    }
}

impl Default for InMemoryVerifyRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

#[async_trait]
impl VerifyRateLimiterTrait for InMemoryVerifyRateLimiter {
    async fn record_attempt(&self, identifier: &str) -> Result<RateLimitStatus, StoreError> {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(identifier.to_string())
            .or_insert(Window {
                started_at: now,
                attempts: 0,
            });

        if now.duration_since(entry.started_at) >= self.policy.window {
            entry.started_at = now;
            entry.attempts = 0;
        }
        entry.attempts = entry.attempts.saturating_add(1);

        let retry_after = self
            .policy
            .window
            .saturating_sub(now.duration_since(entry.started_at));
        Ok(self.policy.status(entry.attempts, retry_after))
    }

    async fn reset(&self, identifier: &str) -> Result<(), StoreError> {
        self.windows.remove(identifier);
        Ok(())
    }
}
