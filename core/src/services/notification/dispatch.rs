//! Notification dispatch gateway

use std::sync::Arc;

use ns_shared::masking::mask_identifier;
use ns_shared::validation::{is_valid_e164, is_valid_email};

use crate::domain::entities::notification::{
    NotificationEnvelope, NotificationKind, NotificationRequest,
};
use crate::errors::{DomainError, DomainResult, ValidationError};

use super::traits::NotificationQueueTrait;

/// Longest message accepted for queueing
pub const MAX_MESSAGE_LEN: usize = 10_000;

/// Accepts notification requests and enqueues them for the delivery worker
pub struct DispatchGateway<Q: ?Sized> {
    queue: Arc<Q>,
    topic: String,
}

impl<Q: NotificationQueueTrait + ?Sized> DispatchGateway<Q> {
    /// Create a new dispatch gateway
    ///
    /// # Arguments
    ///
    /// * `queue` - Queue publisher
    /// * `topic` - Topic name, used for logging
    pub fn new(queue: Arc<Q>, topic: impl Into<String>) -> Self {
        Self {
            queue,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Validate and enqueue a notification
    ///
    /// Returns as soon as the queue accepted the message; delivery happens
    /// later on the worker.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Queue message id
    /// * `Err(DomainError::Validation)` - Malformed recipient or message
    /// * `Err(DomainError::QueueUnavailable)` - The queue rejected the publish
    pub async fn notify(&self, request: NotificationRequest) -> DomainResult<String> {
        validate_request(&request)?;

        let envelope = NotificationEnvelope::from_request(request);
        let message_id = self.queue.publish(&envelope).await.map_err(|e| {
            tracing::error!(
                notification_id = %envelope.id,
                kind = %envelope.kind,
                topic = %self.topic,
                error = %e,
                event = "notification_queue_failed",
                "Failed to queue notification"
            );
            DomainError::from(e)
        })?;

        tracing::info!(
            notification_id = %envelope.id,
            message_id = %message_id,
            kind = %envelope.kind,
            recipient = %mask_identifier(&envelope.recipient),
            topic = %self.topic,
            event = "notification_queued",
            "Notification queued"
        );

        Ok(message_id)
    }
}

fn validate_request(request: &NotificationRequest) -> Result<(), ValidationError> {
    if request.recipient.trim().is_empty() {
        return Err(ValidationError::required("recipient"));
    }
    if request.message.trim().is_empty() {
        return Err(ValidationError::required("message"));
    }
    if request.message.len() > MAX_MESSAGE_LEN {
        return Err(ValidationError::InvalidLength {
            field: "message".to_string(),
            expected: MAX_MESSAGE_LEN,
            actual: request.message.len(),
        });
    }

    match request.kind {
        NotificationKind::Sms if !is_valid_e164(&request.recipient) => Err(
            ValidationError::invalid_format("recipient", "expected an E.164 phone number"),
        ),
        NotificationKind::Email if !is_valid_email(&request.recipient) => Err(
            ValidationError::invalid_format("recipient", "expected an email address"),
        ),
        _ => Ok(()),
    }
}
