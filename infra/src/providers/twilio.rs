//! Twilio SMS provider
//!
//! Sends through the Twilio Programmable Messaging REST API:
//! `POST {base}/2010-04-01/Accounts/{sid}/Messages.json` with a form body and
//! HTTP basic auth. The message SID is the provider message id.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, warn};

use ns_core::domain::{DeliveryOptions, DeliveryOutcome, NotificationKind};
use ns_core::services::NotificationProvider;
use ns_shared::config::TwilioSettings;
use ns_shared::masking::mask_identifier;

use super::error_detail;

pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
struct TwilioCredentials {
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

/// Twilio SMS adapter
pub struct TwilioSmsProvider {
    http: reqwest::Client,
    credentials: Option<TwilioCredentials>,
    base_url: String,
}

impl TwilioSmsProvider {
    /// Create the adapter
    ///
    /// The account SID, auth token and sender number are all required;
    /// when any is missing the adapter stays uninitialised.
    pub fn new(settings: &TwilioSettings, http: reqwest::Client) -> Self {
        let credentials = match (
            settings.account_sid.clone(),
            settings.auth_token.clone(),
            settings.from_number.clone(),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => {
                warn!("Twilio credentials incomplete, SMS delivery will fail");
                None
            }
        };

        Self {
            http,
            credentials,
            base_url: TWILIO_API_BASE.to_string(),
        }
    }

    /// Point the adapter at another API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.credentials.is_some()
    }

    async fn post_message(
        &self,
        credentials: &TwilioCredentials,
        recipient: &str,
        message: &str,
    ) -> Result<String, String> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, credentials.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(&[
                ("From", credentials.from_number.as_str()),
                ("To", recipient),
                ("Body", message),
            ])
            .send()
            .await
            .map_err(|e| format!("Twilio request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_detail("Twilio", status, &body));
        }

        let parsed: TwilioMessageResponse = response
            .json()
            .await
            .map_err(|e| format!("Invalid Twilio response: {}", e))?;
        Ok(parsed.sid)
    }
}

#[async_trait]
impl NotificationProvider for TwilioSmsProvider {
    fn kind(&self) -> NotificationKind {
        NotificationKind::Sms
    }

    fn provider_name(&self) -> &'static str {
        "twilio"
    }

    async fn send(&self, recipient: &str, message: &str, _options: &DeliveryOptions) -> DeliveryOutcome {
        let Some(credentials) = &self.credentials else {
            return DeliveryOutcome::failed("Twilio client not initialized");
        };

        debug!("Sending SMS to {}", mask_identifier(recipient));

        match self.post_message(credentials, recipient, message).await {
            Ok(sid) => DeliveryOutcome::sent(sid),
            Err(detail) => {
                error!("Failed to send SMS to {}: {}", mask_identifier(recipient), detail);
                DeliveryOutcome::failed(detail)
            }
        }
    }
}
