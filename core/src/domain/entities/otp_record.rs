//! One-time passcode record, the only persisted entity of the OTP engine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of a passcode unless configured otherwise
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default validity window for a passcode (5 minutes)
pub const DEFAULT_TTL_MINUTES: i64 = 5;

/// Active passcode for one identifier
///
/// At most one record exists per identifier; storing a new record for an
/// identifier replaces the previous one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Opaque caller-supplied key (account handle, phone number, email)
    pub identifier: String,

    /// Numeric passcode
    pub code: String,

    /// Issuance time
    pub created_at: DateTime<Utc>,

    /// `created_at + ttl`
    pub expires_at: DateTime<Utc>,

    /// Set once a verification succeeded
    pub consumed: bool,
}

impl OtpRecord {
    /// Creates a fresh, unconsumed record
    ///
    /// # Arguments
    ///
    /// * `identifier` - Key the passcode is bound to
    /// * `code` - The generated passcode
    /// * `created_at` - Issuance time
    /// * `ttl` - Validity window
    pub fn new(
        identifier: impl Into<String>,
        code: impl Into<String>,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            code: code.into(),
            created_at,
            expires_at: created_at + ttl,
            consumed: false,
        }
    }

    /// A record is expired strictly after `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Seconds until expiry, zero once expired
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

// Keeps passcodes out of debug logs.
impl std::fmt::Debug for OtpRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpRecord")
            .field("identifier", &ns_shared::masking::mask_identifier(&self.identifier))
            .field("code", &"******")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("consumed", &self.consumed)
            .finish()
    }
}
