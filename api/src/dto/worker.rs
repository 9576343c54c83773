use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Push-subscription delivery wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub message: PushMessageBody,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessageBody {
    /// Base64 encoded JSON notification
    pub data: String,
    #[serde(default, alias = "message_id")]
    pub message_id: Option<String>,
    #[serde(default)]
    pub attributes: Option<HashMap<String, String>>,
}

/// Acknowledgement returned to the push subscription
///
/// Always sent with HTTP 200 so the subscription does not redeliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl WorkerResponse {
    pub fn processed() -> Self {
        Self {
            status: "processed".to_string(),
            reason: None,
            detail: None,
        }
    }

    pub fn unsupported_type() -> Self {
        Self {
            status: "error".to_string(),
            reason: Some("unsupported_type".to_string()),
            detail: None,
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            reason: None,
            detail: Some(detail.into()),
        }
    }
}
