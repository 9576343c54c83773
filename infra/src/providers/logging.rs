//! Logging provider for development
//!
//! Writes the notification to the log instead of delivering it and always
//! reports success.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use ns_core::domain::{DeliveryOptions, DeliveryOutcome, NotificationKind};
use ns_core::services::NotificationProvider;
use ns_shared::masking::mask_identifier;

pub struct LoggingProvider {
    kind: NotificationKind,
}

impl LoggingProvider {
    pub fn new(kind: NotificationKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl NotificationProvider for LoggingProvider {
    fn kind(&self) -> NotificationKind {
        self.kind
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, recipient: &str, message: &str, options: &DeliveryOptions) -> DeliveryOutcome {
        let message_id = format!("mock_{}", Uuid::new_v4().simple());

        // Message bodies may carry passcodes; only the length is logged.
        info!(
            kind = %self.kind,
            recipient = %mask_identifier(recipient),
            subject = options.subject.as_deref().unwrap_or(""),
            message_len = message.len(),
            message_id = %message_id,
            event = "mock_notification_sent",
            "Mock provider accepted notification"
        );

        DeliveryOutcome::sent(message_id)
    }
}
