//! Brevo transactional email provider (`POST /v3/smtp/email`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use ns_core::domain::{DeliveryOptions, DeliveryOutcome, NotificationKind};
use ns_core::services::NotificationProvider;
use ns_shared::config::BrevoSettings;
use ns_shared::masking::mask_identifier;

use super::error_detail;

pub const BREVO_API_BASE: &str = "https://api.brevo.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody<'a> {
    sender: BrevoEmailAddress<'a>,
    to: Vec<BrevoEmailAddress<'a>>,
    subject: &'a str,
    text_content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailResponse {
    message_id: String,
}

/// Brevo email adapter
pub struct BrevoEmailProvider {
    http: reqwest::Client,
    api_key: Option<String>,
    from_email: String,
    from_name: Option<String>,
    base_url: String,
}

impl BrevoEmailProvider {
    pub fn new(settings: &BrevoSettings, http: reqwest::Client) -> Self {
        if settings.api_key.is_none() {
            warn!("BREVO_API_KEY not set, email delivery will fail");
        }
        Self {
            http,
            api_key: settings.api_key.clone(),
            from_email: settings.from_email.clone(),
            from_name: settings.from_name.clone(),
            base_url: BREVO_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.api_key.is_some()
    }

    async fn post_email(
        &self,
        api_key: &str,
        recipient: &str,
        message: &str,
        subject: &str,
    ) -> Result<String, String> {
        let body = BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: &self.from_email,
                name: self.from_name.as_deref(),
            },
            to: vec![BrevoEmailAddress {
                email: recipient,
                name: None,
            }],
            subject,
            text_content: message,
        };

        let response = self
            .http
            .post(format!("{}/v3/smtp/email", self.base_url))
            .header("api-key", api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Brevo request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_detail("Brevo", status, &body));
        }

        let parsed: BrevoSendEmailResponse = response
            .json()
            .await
            .map_err(|e| format!("Invalid Brevo response: {}", e))?;
        Ok(parsed.message_id)
    }
}

#[async_trait]
impl NotificationProvider for BrevoEmailProvider {
    fn kind(&self) -> NotificationKind {
        NotificationKind::Email
    }

    fn provider_name(&self) -> &'static str {
        "brevo"
    }

    async fn send(&self, recipient: &str, message: &str, options: &DeliveryOptions) -> DeliveryOutcome {
        let Some(api_key) = &self.api_key else {
            return DeliveryOutcome::failed("Brevo client not initialized");
        };

        debug!("Sending email to {}", mask_identifier(recipient));

        match self
            .post_email(api_key, recipient, message, options.subject_or_default())
            .await
        {
            Ok(message_id) => DeliveryOutcome::sent(message_id),
            Err(detail) => {
                error!("Failed to send email to {}: {}", mask_identifier(recipient), detail);
                DeliveryOutcome::failed(detail)
            }
        }
    }
}
