//! Notification entities flowing from the dispatch gateway to the delivery worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Subject used for email notifications that do not carry one
pub const DEFAULT_EMAIL_SUBJECT: &str = "Notification";

/// Delivery channel of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Sms,
    Email,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Sms => "sms",
            NotificationKind::Email => "email",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sms" => Ok(NotificationKind::Sms),
            "email" => Ok(NotificationKind::Email),
            _ => Err(format!("Unsupported notification type: {}", s)),
        }
    }
}

/// Inbound request to send a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub recipient: String,
    pub message: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl NotificationRequest {
    pub fn new(
        kind: NotificationKind,
        recipient: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            recipient: recipient.into(),
            message: message.into(),
            metadata: Map::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Message placed on the queue
///
/// Serialises with a `type` discriminator so the body matches what push
/// subscriptions deliver to the worker endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub recipient: String,
    pub message: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub enqueued_at: DateTime<Utc>,
}

impl NotificationEnvelope {
    /// Wrap a request with a fresh id and enqueue timestamp
    pub fn from_request(request: NotificationRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: request.kind,
            recipient: request.recipient,
            message: request.message,
            metadata: request.metadata,
            enqueued_at: Utc::now(),
        }
    }

    pub fn options(&self) -> DeliveryOptions {
        DeliveryOptions::from_metadata(&self.metadata)
    }
}

/// Provider-facing options extracted from notification metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryOptions {
    /// Email subject
    pub subject: Option<String>,
    /// Remaining metadata, passed through untouched
    pub metadata: Map<String, Value>,
}

impl DeliveryOptions {
    pub fn from_metadata(metadata: &Map<String, Value>) -> Self {
        let subject = metadata
            .get("subject")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            subject,
            metadata: metadata.clone(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Subject, or [`DEFAULT_EMAIL_SUBJECT`]
    pub fn subject_or_default(&self) -> &str {
        self.subject.as_deref().unwrap_or(DEFAULT_EMAIL_SUBJECT)
    }
}

/// Result of handing a message to a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Sent { provider_message_id: String },
    Failed { error_detail: String },
}

impl DeliveryOutcome {
    pub fn sent(provider_message_id: impl Into<String>) -> Self {
        DeliveryOutcome::Sent {
            provider_message_id: provider_message_id.into(),
        }
    }

    pub fn failed(error_detail: impl Into<String>) -> Self {
        DeliveryOutcome::Failed {
            error_detail: error_detail.into(),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent { .. })
    }
}
