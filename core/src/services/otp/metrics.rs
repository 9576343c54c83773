//! Counters for the OTP lifecycle

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::RejectionReason;

/// Lock-free counters shared by every clone of the service
#[derive(Debug, Default)]
pub struct OtpMetrics {
    issued: AtomicU64,
    issue_retries: AtomicU64,
    verified: AtomicU64,
    rejected_not_found: AtomicU64,
    rejected_expired: AtomicU64,
    rejected_mismatch: AtomicU64,
    rejected_concurrent: AtomicU64,
    rate_limited: AtomicU64,
    store_failures: AtomicU64,
    swept: AtomicU64,
}

/// Point-in-time copy of [`OtpMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OtpMetricsSnapshot {
    pub issued: u64,
    pub issue_retries: u64,
    pub verified: u64,
    pub rejected_not_found: u64,
    pub rejected_expired: u64,
    pub rejected_mismatch: u64,
    pub rejected_concurrent: u64,
    pub rate_limited: u64,
    pub store_failures: u64,
    pub swept: u64,
}

impl OtpMetricsSnapshot {
    pub fn rejected_total(&self) -> u64 {
        self.rejected_not_found
            + self.rejected_expired
            + self.rejected_mismatch
            + self.rejected_concurrent
    }
}

impl OtpMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_issued(&self) {
        self.issued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_issue_retry(&self) {
        self.issue_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_verified(&self) {
        self.verified.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self, reason: RejectionReason) {
        let counter = match reason {
            RejectionReason::NotFound => &self.rejected_not_found,
            RejectionReason::Expired => &self.rejected_expired,
            RejectionReason::Mismatch => &self.rejected_mismatch,
            RejectionReason::ConcurrentConsumptionLost => &self.rejected_concurrent,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_swept(&self, count: usize) {
        self.swept.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> OtpMetricsSnapshot {
        OtpMetricsSnapshot {
            issued: self.issued.load(Ordering::Relaxed),
            issue_retries: self.issue_retries.load(Ordering::Relaxed),
            verified: self.verified.load(Ordering::Relaxed),
            rejected_not_found: self.rejected_not_found.load(Ordering::Relaxed),
            rejected_expired: self.rejected_expired.load(Ordering::Relaxed),
            rejected_mismatch: self.rejected_mismatch.load(Ordering::Relaxed),
            rejected_concurrent: self.rejected_concurrent.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
        }
    }
}
