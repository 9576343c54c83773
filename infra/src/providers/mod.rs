//! Delivery provider adapters
//!
//! Each adapter implements [`NotificationProvider`] for one channel. Adapters
//! constructed without credentials stay uninitialised and report a failed
//! delivery instead of calling out, so a development setup runs without any
//! provider account.

pub mod brevo;
pub mod logging;
pub mod sendgrid;
pub mod twilio;


pub use brevo::BrevoEmailProvider;
pub use logging::LoggingProvider;
pub use sendgrid::SendGridEmailProvider;
pub use twilio::TwilioSmsProvider;

use std::sync::Arc;
use std::time::Duration;

use ns_core::domain::NotificationKind;
use ns_core::services::{DeliveryWorker, NotificationProvider};
use ns_shared::config::{EmailProviderKind, ProviderConfig, SmsProviderKind};

use crate::InfrastructureError;

/// Build the HTTP client shared by the provider adapters
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, InfrastructureError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(concat!("notification-service/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Create the SMS provider selected by configuration
pub fn create_sms_provider(
    config: &ProviderConfig,
    http: reqwest::Client,
) -> Arc<dyn NotificationProvider> {
    match config.sms_provider {
        SmsProviderKind::Twilio => Arc::new(TwilioSmsProvider::new(&config.twilio, http)),
        SmsProviderKind::Mock => Arc::new(LoggingProvider::new(NotificationKind::Sms)),
    }
}

/// Create the email provider selected by configuration
pub fn create_email_provider(
    config: &ProviderConfig,
    http: reqwest::Client,
) -> Arc<dyn NotificationProvider> {
    match config.email_provider {
        EmailProviderKind::SendGrid => Arc::new(SendGridEmailProvider::new(&config.sendgrid, http)),
        EmailProviderKind::Brevo => Arc::new(BrevoEmailProvider::new(&config.brevo, http)),
        EmailProviderKind::Mock => Arc::new(LoggingProvider::new(NotificationKind::Email)),
    }
}

/// Build a delivery worker with one provider per channel
///
/// # Arguments
/// * `config` - Provider selection and credentials
///
/// # Returns
/// * `Result<DeliveryWorker, InfrastructureError>` - Worker or HTTP client error
pub fn build_delivery_worker(config: &ProviderConfig) -> Result<DeliveryWorker, InfrastructureError> {
    let http = http_client(config.request_timeout_secs)?;

    let sms = create_sms_provider(config, http.clone());
    let email = create_email_provider(config, http);

    tracing::info!(
        sms_provider = sms.provider_name(),
        email_provider = email.provider_name(),
        "Delivery providers configured"
    );

    Ok(DeliveryWorker::builder().register(sms).register(email).build())
}

/// Render a provider error response as `error_detail`
pub(crate) fn error_detail(provider: &str, status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("{} API error: {}", provider, status)
    } else {
        format!("{} API error: {}: {}", provider, status, body)
    }
}
