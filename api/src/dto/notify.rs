use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use ns_core::domain::{NotificationKind, NotificationRequest};

/// Body of `POST /api/v1/notify`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotifyRequest {
    /// Phone number (E.164) for `sms`, address for `email`
    #[validate(length(min = 1, max = 256))]
    pub recipient: String,

    #[validate(length(min = 1, max = 10000))]
    pub message: String,

    /// `sms` or `email`
    #[serde(rename = "type")]
    pub kind: NotificationKind,

    /// Free-form options; `subject` is used by email providers
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl From<NotifyRequest> for NotificationRequest {
    fn from(request: NotifyRequest) -> Self {
        NotificationRequest {
            kind: request.kind,
            recipient: request.recipient,
            message: request.message,
            metadata: request.metadata.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub message_id: String,
}
