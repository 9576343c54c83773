//! SendGrid email provider (`POST /v3/mail/send`)

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, warn};

use ns_core::domain::{DeliveryOptions, DeliveryOutcome, NotificationKind};
use ns_core::services::NotificationProvider;
use ns_shared::config::SendGridSettings;
use ns_shared::masking::mask_identifier;

use super::error_detail;

pub const SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

/// Id reported when SendGrid omits the `X-Message-Id` header
const UNKNOWN_MESSAGE_ID: &str = "N/A";

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<EmailAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct MailSendBody<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: EmailAddress<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

/// SendGrid email adapter
pub struct SendGridEmailProvider {
    http: reqwest::Client,
    api_key: Option<String>,
    from_email: String,
    base_url: String,
}

impl SendGridEmailProvider {
    pub fn new(settings: &SendGridSettings, http: reqwest::Client) -> Self {
        if settings.api_key.is_none() {
            warn!("SENDGRID_API_KEY not set, email delivery will fail");
        }
        Self {
            http,
            api_key: settings.api_key.clone(),
            from_email: settings.from_email.clone(),
            base_url: SENDGRID_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl NotificationProvider for SendGridEmailProvider {
    fn kind(&self) -> NotificationKind {
        NotificationKind::Email
    }

    fn provider_name(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, recipient: &str, message: &str, options: &DeliveryOptions) -> DeliveryOutcome {
        let Some(api_key) = &self.api_key else {
            return DeliveryOutcome::failed("SendGrid client not initialized");
        };

        let body = MailSendBody {
            personalizations: vec![Personalization {
                to: vec![EmailAddress { email: recipient }],
            }],
            from: EmailAddress {
                email: &self.from_email,
            },
            subject: options.subject_or_default(),
            content: vec![Content {
                content_type: "text/plain",
                value: message,
            }],
        };

        debug!("Sending email to {}", mask_identifier(recipient));

        let response = match self
            .http
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("SendGrid request failed: {}", e);
                return DeliveryOutcome::failed(format!("SendGrid request failed: {}", e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail("SendGrid", status, &body);
            error!("Failed to send email to {}: {}", mask_identifier(recipient), detail);
            return DeliveryOutcome::failed(detail);
        }

        let message_id = response
            .headers()
            .get("X-Message-Id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or(UNKNOWN_MESSAGE_ID)
            .to_string();
        DeliveryOutcome::sent(message_id)
    }
}
