//! Delivery provider configuration
//!
//! Credentials are optional: an adapter constructed without them stays
//! uninitialised and reports a failed delivery instead of calling out.

use serde::{Deserialize, Serialize};

use super::{env_opt, env_parse, env_string};

/// Provider used for SMS delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProviderKind {
    Twilio,
    Mock,
}

impl std::str::FromStr for SmsProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "twilio" => Ok(SmsProviderKind::Twilio),
            "mock" => Ok(SmsProviderKind::Mock),
            _ => Err(format!("Invalid SMS provider: {}", s)),
        }
    }
}

/// Provider used for email delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProviderKind {
    SendGrid,
    Brevo,
    Mock,
}

impl std::str::FromStr for EmailProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sendgrid" => Ok(EmailProviderKind::SendGrid),
            "brevo" => Ok(EmailProviderKind::Brevo),
            "mock" => Ok(EmailProviderKind::Mock),
            _ => Err(format!("Invalid email provider: {}", s)),
        }
    }
}

/// Twilio account settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TwilioSettings {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Sender number in E.164 format
    pub from_number: Option<String>,
}

/// SendGrid account settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendGridSettings {
    pub api_key: Option<String>,
    pub from_email: String,
}

/// Brevo account settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrevoSettings {
    pub api_key: Option<String>,
    pub from_email: String,
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub sms_provider: SmsProviderKind,
    pub email_provider: EmailProviderKind,
    pub twilio: TwilioSettings,
    pub sendgrid: SendGridSettings,
    pub brevo: BrevoSettings,
    /// Timeout for outbound provider HTTP calls, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            sms_provider: SmsProviderKind::Mock,
            email_provider: EmailProviderKind::Mock,
            twilio: TwilioSettings::default(),
            sendgrid: SendGridSettings {
                api_key: None,
                from_email: String::from("notifications@example.com"),
            },
            brevo: BrevoSettings {
                api_key: None,
                from_email: String::from("notifications@example.com"),
                from_name: None,
            },
            request_timeout_secs: 10,
        }
    }
}

impl ProviderConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sms_provider: env_parse("SMS_PROVIDER", defaults.sms_provider),
            email_provider: env_parse("EMAIL_PROVIDER", defaults.email_provider),
            twilio: TwilioSettings {
                account_sid: env_opt("TWILIO_ACCOUNT_SID"),
                auth_token: env_opt("TWILIO_AUTH_TOKEN"),
                from_number: env_opt("TWILIO_PHONE_NUMBER"),
            },
            sendgrid: SendGridSettings {
                api_key: env_opt("SENDGRID_API_KEY"),
                from_email: env_string("SENDGRID_FROM_EMAIL", &defaults.sendgrid.from_email),
            },
            brevo: BrevoSettings {
                api_key: env_opt("BREVO_API_KEY"),
                from_email: env_string("BREVO_FROM_EMAIL", &defaults.brevo.from_email),
                from_name: env_opt("BREVO_FROM_NAME"),
            },
            request_timeout_secs: env_parse(
                "PROVIDER_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )
            .max(1),
        }
    }
}
