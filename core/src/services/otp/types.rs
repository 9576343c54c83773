//! Types for OTP store and service results

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of an atomic check-and-consume against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Code matched; the record has been removed
    Success,
    /// No record for the identifier
    NotFound,
    /// Record present but already consumed
    AlreadyUsed,
    /// Record expired; it has been removed
    Expired,
    /// Code did not match; the record is left intact
    Mismatch,
}

impl ConsumeOutcome {
    /// Internal reason for a failed verification, `None` on success
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            ConsumeOutcome::Success => None,
            ConsumeOutcome::NotFound => Some(RejectionReason::NotFound),
            ConsumeOutcome::AlreadyUsed => Some(RejectionReason::ConcurrentConsumptionLost),
            ConsumeOutcome::Expired => Some(RejectionReason::Expired),
            ConsumeOutcome::Mismatch => Some(RejectionReason::Mismatch),
        }
    }
}

/// Why a verification was rejected; only ever logged and counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NotFound,
    Expired,
    Mismatch,
    ConcurrentConsumptionLost,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::NotFound => "not_found",
            RejectionReason::Expired => "expired",
            RejectionReason::Mismatch => "mismatch",
            RejectionReason::ConcurrentConsumptionLost => "concurrent_consumption_lost",
        }
    }
}

/// A freshly issued passcode
///
/// The caller decides how to disclose `code`; the HTTP layer only ever
/// forwards it to the notification channel.
#[derive(Clone)]
pub struct IssuedOtp {
    pub identifier: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedOtp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedOtp")
            .field("identifier", &ns_shared::masking::mask_identifier(&self.identifier))
            .field("code", &"******")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Verify-attempt budget after recording one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Whether this attempt may proceed
    pub allowed: bool,
    /// Attempts recorded in the current window, this one included
    pub attempts: u32,
    /// Attempts left in the current window
    pub remaining: u32,
    /// Seconds until the window resets
    pub retry_after_seconds: u64,
}
