use serde::{Deserialize, Serialize};
use validator::Validate;

use ns_core::domain::NotificationKind;
use ns_core::errors::ValidationError;
use ns_shared::validation::{is_valid_e164, is_valid_email};

/// Body of `POST /api/v1/otp/generate`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateOtpRequest {
    /// Unique identifier for the user (e.g. email or phone)
    #[validate(length(min = 1, max = 256))]
    pub identifier: String,

    /// When set, the code is sent to `identifier` over this channel
    #[serde(default)]
    pub channel: Option<NotificationKind>,
}

impl GenerateOtpRequest {
    /// Check that the identifier can receive the code on the chosen channel
    pub fn validate_channel(&self) -> Result<(), ValidationError> {
        match self.channel {
            Some(NotificationKind::Sms) if !is_valid_e164(&self.identifier) => Err(
                ValidationError::invalid_format("identifier", "must be an E.164 phone number for sms delivery"),
            ),
            Some(NotificationKind::Email) if !is_valid_email(&self.identifier) => Err(
                ValidationError::invalid_format("identifier", "must be an email address for email delivery"),
            ),
            _ => Ok(()),
        }
    }
}

/// The passcode itself is never part of the response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOtpResponse {
    pub identifier: String,
    /// Queue message id of the delivery, when a channel was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Body of `POST /api/v1/otp/verify`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(length(min = 1, max = 256))]
    pub identifier: String,

    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub verified: bool,
}
