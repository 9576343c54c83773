//! Redis-based verify-attempt limiter
//!
//! Fixed window per identifier: `INCR` the counter and start the window
//! with `EXPIRE` on the first hit, both inside one script.

use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use std::sync::Arc;
use std::time::Duration;

use ns_core::errors::StoreError;
use ns_core::services::{RateLimitPolicy, RateLimitStatus, VerifyRateLimiterTrait};

use super::redis_client::RedisClient;

const ATTEMPT_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
local ttl = redis.call('TTL', KEYS[1])
if count == 1 or ttl < 0 then
  redis.call('EXPIRE', KEYS[1], ARGV[1])
  ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

/// Redis-based implementation of the verify limiter trait
pub struct RedisVerifyRateLimiter {
    redis_client: Arc<RedisClient>,
    policy: RateLimitPolicy,
    script: Script,
}

impl RedisVerifyRateLimiter {
    /// Create a new Redis-based verify limiter
    pub fn new(redis_client: Arc<RedisClient>, policy: RateLimitPolicy) -> Self {
        Self {
            redis_client,
            policy,
            script: Script::new(ATTEMPT_SCRIPT),
        }
    }

    fn key(&self, identifier: &str) -> String {
        self.redis_client
            .make_key(&format!("otp_verify_attempts:{}", identifier))
    }
}

#[async_trait]
impl VerifyRateLimiterTrait for RedisVerifyRateLimiter {
    async fn record_attempt(&self, identifier: &str) -> Result<RateLimitStatus, StoreError> {
        let mut conn = self.redis_client.get_connection();
        let window_secs = self.policy.window.as_secs().max(1);

        let (count, ttl): (i64, i64) = self
            .script
            .key(self.key(identifier))
            .arg(window_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let attempts = u32::try_from(count).unwrap_or(u32::MAX);
        let retry_after = Duration::from_secs(ttl.max(0) as u64);
        Ok(self.policy.status(attempts, retry_after))
    }

    async fn reset(&self, identifier: &str) -> Result<(), StoreError> {
        let mut conn = self.redis_client.get_connection();
        conn.del::<_, ()>(self.key(identifier))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}
