//! OTP lifecycle engine: issue and verify

use chrono::{Duration, Utc};
use std::future::Future;
use std::sync::Arc;

use ns_shared::masking::mask_identifier;
use ns_shared::validation::{is_numeric_code, is_valid_identifier, MAX_IDENTIFIER_LEN};

use crate::domain::entities::notification::{NotificationKind, NotificationRequest};
use crate::domain::entities::otp_record::OtpRecord;
use crate::errors::{DomainError, DomainResult, StoreError, ValidationError};

use super::config::OtpServiceConfig;
use super::generator::PasscodeGenerator;
use super::metrics::OtpMetrics;
use super::traits::{OtpStoreTrait, VerifyRateLimiterTrait};
use super::types::IssuedOtp;

/// Orchestrates passcode issuance and single-use verification
///
/// Per identifier the engine moves through `NoRecord -> Active -> {Consumed,
/// Expired}`; both terminal states collapse back to `NoRecord` because the
/// store deletes the record in the same atomic step that detects them.
pub struct OtpService<S: ?Sized, L: ?Sized> {
    /// Passcode storage
    store: Arc<S>,
    /// Verify-attempt limiter
    limiter: Arc<L>,
    generator: PasscodeGenerator,
    config: OtpServiceConfig,
    metrics: Arc<OtpMetrics>,
}

impl<S, L> OtpService<S, L>
where
    S: OtpStoreTrait + ?Sized,
    L: VerifyRateLimiterTrait + ?Sized,
{
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `store` - OTP store implementation
    /// * `limiter` - Verify-attempt limiter implementation
    /// * `config` - Service configuration
    pub fn new(store: Arc<S>, limiter: Arc<L>, config: OtpServiceConfig) -> Self {
        Self {
            store,
            limiter,
            generator: PasscodeGenerator::new(config.code_length),
            config,
            metrics: Arc::new(OtpMetrics::new()),
        }
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<OtpMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Issue a fresh passcode for an identifier
    ///
    /// Any record already held by the identifier is replaced, so only the
    /// newest code verifies. Storing is idempotent, which makes it safe to
    /// retry after a store failure.
    ///
    /// # Arguments
    ///
    /// * `identifier` - Opaque key the passcode is bound to
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedOtp)` - The stored passcode and its expiry
    /// * `Err(DomainError::Validation)` - Malformed identifier
    /// * `Err(DomainError::StoreUnavailable)` - Store failed on every attempt
    pub async fn issue(&self, identifier: &str) -> DomainResult<IssuedOtp> {
        validate_identifier(identifier)?;

        let code = self.generator.generate();
        let record = OtpRecord::new(identifier, code, Utc::now(), self.config.ttl);

        let mut attempt: u32 = 0;
        loop {
            match self.bounded(self.store.put(&record)).await {
                Ok(()) => break,
                Err(e) if attempt < self.config.issue_retries => {
                    attempt += 1;
                    self.metrics.record_issue_retry();
                    tracing::warn!(
                        identifier = %mask_identifier(identifier),
                        attempt = attempt,
                        error = %e,
                        event = "otp_store_retry",
                        "Retrying OTP store write"
                    );
                    tokio::time::sleep(self.config.issue_retry_delay).await;
                }
                Err(e) => {
                    self.metrics.record_store_failure();
                    tracing::error!(
                        identifier = %mask_identifier(identifier),
                        attempts = attempt + 1,
                        error = %e,
                        event = "otp_storage_failed",
                        "Failed to store OTP"
                    );
                    return Err(e.into());
                }
            }
        }

        self.metrics.record_issued();
        tracing::info!(
            identifier = %mask_identifier(identifier),
            expires_at = %record.expires_at,
            event = "otp_generated",
            "Generated new OTP"
        );

        Ok(IssuedOtp {
            identifier: record.identifier,
            code: record.code,
            expires_at: record.expires_at,
        })
    }

    /// Verify and consume a passcode
    ///
    /// The store is consulted exactly once and a store failure is surfaced
    /// to the caller without a retry.
    ///
    /// # Arguments
    ///
    /// * `identifier` - Key the passcode was issued for
    /// * `code` - Submitted passcode
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Code was valid and is now consumed
    /// * `Ok(false)` - Unknown identifier, wrong code, expired or already used
    /// * `Err(DomainError::Validation)` - Malformed identifier or code
    /// * `Err(DomainError::RateLimitExceeded)` - Attempt budget exhausted
    /// * `Err(DomainError::StoreUnavailable)` - Could not check the code
    pub async fn verify(&self, identifier: &str, code: &str) -> DomainResult<bool> {
        validate_identifier(identifier)?;
        self.validate_code(code)?;

        let status = self
            .bounded(self.limiter.record_attempt(identifier))
            .await
            .map_err(|e| self.store_failure(identifier, "record_attempt", e))?;

        if !status.allowed {
            self.metrics.record_rate_limited();
            tracing::warn!(
                identifier = %mask_identifier(identifier),
                attempts = status.attempts,
                retry_after_seconds = status.retry_after_seconds,
                event = "otp_verify_rate_limited",
                "Verification attempt limit exceeded"
            );
            return Err(DomainError::RateLimitExceeded {
                retry_after_seconds: status.retry_after_seconds,
            });
        }

        let outcome = self
            .bounded(self.store.try_consume(identifier, code, Utc::now()))
            .await
            .map_err(|e| self.store_failure(identifier, "try_consume", e))?;

        match outcome.rejection_reason() {
            None => {
                self.metrics.record_verified();
                if let Err(e) = self.bounded(self.limiter.reset(identifier)).await {
                    // Code is already consumed at this point.
                    tracing::warn!(
                        identifier = %mask_identifier(identifier),
                        error = %e,
                        event = "otp_limiter_reset_failed",
                        "Failed to reset verify attempt counter"
                    );
                }
                tracing::info!(
                    identifier = %mask_identifier(identifier),
                    event = "otp_verified",
                    "OTP verified and consumed"
                );
                Ok(true)
            }
            Some(reason) => {
                self.metrics.record_rejection(reason);
                tracing::info!(
                    identifier = %mask_identifier(identifier),
                    reason = reason.as_str(),
                    remaining_attempts = status.remaining,
                    event = "otp_rejected",
                    "OTP verification rejected"
                );
                Ok(false)
            }
        }
    }

    /// Remove expired records from the store
    pub async fn sweep_expired(&self) -> DomainResult<usize> {
        let removed = self
            .bounded(self.store.purge_expired(Utc::now()))
            .await
            .map_err(|e| {
                self.metrics.record_store_failure();
                DomainError::from(e)
            })?;

        self.metrics.record_swept(removed);
        if removed > 0 {
            tracing::debug!(removed = removed, event = "otp_sweep", "Purged expired OTPs");
        }
        Ok(removed)
    }

    fn validate_code(&self, code: &str) -> Result<(), ValidationError> {
        if code.is_empty() {
            return Err(ValidationError::required("otp"));
        }
        if code.chars().count() != self.config.code_length {
            return Err(ValidationError::InvalidLength {
                field: "otp".to_string(),
                expected: self.config.code_length,
                actual: code.chars().count(),
            });
        }
        if !is_numeric_code(code, self.config.code_length) {
            return Err(ValidationError::invalid_format("otp", "must contain digits only"));
        }
        Ok(())
    }

    fn store_failure(&self, identifier: &str, operation: &'static str, err: StoreError) -> DomainError {
        self.metrics.record_store_failure();
        tracing::error!(
            identifier = %mask_identifier(identifier),
            operation = operation,
            error = %err,
            event = "otp_store_unavailable",
            "OTP store call failed"
        );
        err.into()
    }

    /// Apply the configured store timeout to a store or limiter call
    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

fn validate_identifier(identifier: &str) -> Result<(), ValidationError> {
    if identifier.trim().is_empty() {
        return Err(ValidationError::required("identifier"));
    }
    if !is_valid_identifier(identifier) {
        return Err(ValidationError::invalid_format(
            "identifier",
            format!("must be at most {} printable characters", MAX_IDENTIFIER_LEN),
        ));
    }
    Ok(())
}

/// Build the notification that delivers a freshly issued passcode
///
/// # Arguments
///
/// * `kind` - Channel to deliver over
/// * `recipient` - Phone number or email address
/// * `code` - The passcode
/// * `ttl` - Validity window, quoted to the recipient
pub fn otp_notification(
    kind: NotificationKind,
    recipient: &str,
    code: &str,
    ttl: Duration,
) -> NotificationRequest {
    let minutes = ttl.num_minutes().max(1);
    let message = format!(
        "Your verification code is {}. It expires in {} minute{}.",
        code,
        minutes,
        if minutes == 1 { "" } else { "s" }
    );
    NotificationRequest::new(kind, recipient, message)
        .with_metadata("subject", "Your verification code")
        .with_metadata("purpose", "otp")
}
