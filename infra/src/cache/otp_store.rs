//! Redis-backed OTP store
//!
//! One key per identifier holds a JSON record. The Redis key TTL is the
//! record TTL plus a grace period, so abandoned records disappear on their
//! own while expiry itself is still decided by `try_consume` against the
//! caller's clock. The check-and-consume runs as a single Lua script, which
//! Redis executes atomically; it compares SHA-1 digests of the codes rather
//! than the codes themselves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Script};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use ns_core::domain::OtpRecord;
use ns_core::errors::StoreError;
use ns_core::services::{ConsumeOutcome, OtpStoreTrait};
use ns_shared::masking::mask_identifier;

use super::redis_client::RedisClient;

/// Seconds a record outlives its expiry inside Redis
pub const DEFAULT_GRACE_SECONDS: i64 = 60;

const CONSUME_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return 'not_found'
end
local ok, record = pcall(cjson.decode, raw)
if not ok or type(record) ~= 'table' or type(record.code) ~= 'string' then
  return 'corrupt'
end
if record.consumed then
  return 'already_used'
end
if tonumber(ARGV[2]) > tonumber(record.expires_at_ms) then
  redis.call('DEL', KEYS[1])
  return 'expired'
end
-- Digests are compared so timing does not reveal a matching code prefix
if redis.sha1hex(record.code) ~= redis.sha1hex(ARGV[1]) then
  return 'mismatch'
end
redis.call('DEL', KEYS[1])
return 'success'
"#;

/// Stored JSON body of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredOtp {
    pub code: String,
    pub created_at_ms: i64,
    pub expires_at_ms: i64,
    pub consumed: bool,
}

impl From<&OtpRecord> for StoredOtp {
    fn from(record: &OtpRecord) -> Self {
        Self {
            code: record.code.clone(),
            created_at_ms: record.created_at.timestamp_millis(),
            expires_at_ms: record.expires_at.timestamp_millis(),
            consumed: record.consumed,
        }
    }
}

/// Map the status string returned by the consume script
pub(crate) fn parse_consume_status(status: &str) -> Result<ConsumeOutcome, StoreError> {
    match status {
        "success" => Ok(ConsumeOutcome::Success),
        "not_found" => Ok(ConsumeOutcome::NotFound),
        "already_used" => Ok(ConsumeOutcome::AlreadyUsed),
        "expired" => Ok(ConsumeOutcome::Expired),
        "mismatch" => Ok(ConsumeOutcome::Mismatch),
        "corrupt" => Err(StoreError::Corrupt("undecodable OTP record".to_string())),
        other => Err(StoreError::Corrupt(format!("unexpected script status: {}", other))),
    }
}

/// Key TTL for a record: remaining validity plus grace, at least one second
pub(crate) fn key_ttl_seconds(record: &OtpRecord, now: DateTime<Utc>, grace_seconds: i64) -> u64 {
    (record.remaining_seconds(now) + grace_seconds).max(1) as u64
}

pub struct RedisOtpStore {
    client: Arc<RedisClient>,
    collection: String,
    grace_seconds: i64,
    consume_script: Script,
}

impl RedisOtpStore {
    /// Create a store writing under `{prefix}:{collection}:{identifier}`
    pub fn new(client: Arc<RedisClient>, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
            grace_seconds: DEFAULT_GRACE_SECONDS,
            consume_script: Script::new(CONSUME_SCRIPT),
        }
    }

    pub fn with_grace_seconds(mut self, grace_seconds: i64) -> Self {
        self.grace_seconds = grace_seconds.max(0);
        self
    }

    pub(crate) fn key(&self, identifier: &str) -> String {
        self.client
            .make_key(&format!("{}:{}", self.collection, identifier))
    }
}

fn unavailable(e: redis::RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl OtpStoreTrait for RedisOtpStore {
    async fn put(&self, record: &OtpRecord) -> Result<(), StoreError> {
        let body = serde_json::to_string(&StoredOtp::from(record))
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let ttl = key_ttl_seconds(record, Utc::now(), self.grace_seconds);

        let mut conn = self.client.get_connection();
        conn.set_ex::<_, _, ()>(self.key(&record.identifier), body, ttl)
            .await
            .map_err(unavailable)?;

        debug!(
            identifier = %mask_identifier(&record.identifier),
            ttl_seconds = ttl,
            "Stored OTP record in Redis"
        );
        Ok(())
    }

    async fn try_consume(
        &self,
        identifier: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, StoreError> {
        let mut conn = self.client.get_connection();
        let status: String = self
            .consume_script
            .key(self.key(identifier))
            .arg(code)
            .arg(now.timestamp_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;

        parse_consume_status(&status)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, StoreError> {
        // Keys carry their own TTL; Redis evicts them without help.
        Ok(0)
    }
}
