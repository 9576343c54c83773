//! In-memory OTP store backed by a sharded concurrent map

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::entities::otp_record::OtpRecord;
use crate::errors::StoreError;

use super::traits::OtpStoreTrait;
use super::types::ConsumeOutcome;

/// Process-local OTP store
///
/// The check-and-delete in `try_consume` runs while holding the entry guard
/// of the identifier's shard, so calls for one identifier are serialised and
/// calls for different identifiers only meet on a shared shard briefly. No
/// guard is ever held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryOtpStore {
    records: DashMap<String, OtpRecord>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record exists for `identifier`
    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier)
    }
}

#[async_trait]
impl OtpStoreTrait for InMemoryOtpStore {
    async fn put(&self, record: &OtpRecord) -> Result<(), StoreError> {
        self.records
            .insert(record.identifier.clone(), record.clone());
        Ok(())
    }

    async fn try_consume(
        &self,
        identifier: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, StoreError> {
        let outcome = match self.records.entry(identifier.to_string()) {
            Entry::Vacant(_) => ConsumeOutcome::NotFound,
            Entry::Occupied(entry) => {
                let record = entry.get();
                if record.consumed {
                    ConsumeOutcome::AlreadyUsed
                } else if record.is_expired_at(now) {
                    entry.remove();
                    ConsumeOutcome::Expired
                } else if !constant_time_eq(record.code.as_bytes(), code.as_bytes()) {
                    ConsumeOutcome::Mismatch
                } else {
                    entry.remove();
                    ConsumeOutcome::Success
                }
            }
        };
        Ok(outcome)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut removed = 0;
        self.records.retain(|_, record| {
            let keep = !record.consumed && !record.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
