//! Traits for OTP storage and verify-attempt limiting

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::otp_record::OtpRecord;
use crate::errors::StoreError;

use super::types::{ConsumeOutcome, RateLimitStatus};

/// Storage contract for passcode records
///
/// Implementations must make `try_consume` linearizable per identifier: of
/// two concurrent calls presenting the right code, exactly one observes
/// `Success`. A call that is cancelled midway must either complete or leave
/// the record untouched.
#[async_trait]
pub trait OtpStoreTrait: Send + Sync {
    /// Upsert the record for `record.identifier`, replacing any previous one
    async fn put(&self, record: &OtpRecord) -> Result<(), StoreError>;

    /// Atomically read, check and (on success or expiry) remove the record
    ///
    /// # Arguments
    ///
    /// * `identifier` - Key the passcode was issued for
    /// * `code` - Submitted passcode
    /// * `now` - Clock reading used for the expiry check
    async fn try_consume(
        &self,
        identifier: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, StoreError>;

    /// Remove every record expired at `now`, returning how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// Per-identifier budget for verification attempts
#[async_trait]
pub trait VerifyRateLimiterTrait: Send + Sync {
    /// Count one attempt and report whether it is within budget
    async fn record_attempt(&self, identifier: &str) -> Result<RateLimitStatus, StoreError>;

    /// Clear the counter for an identifier
    async fn reset(&self, identifier: &str) -> Result<(), StoreError>;
}
