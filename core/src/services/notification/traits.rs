//! Traits for the notification queue and delivery providers

use async_trait::async_trait;

use crate::domain::entities::notification::{
    DeliveryOptions, DeliveryOutcome, NotificationEnvelope, NotificationKind,
};
use crate::errors::QueueError;

/// Publishing side of the notification queue
#[async_trait]
pub trait NotificationQueueTrait: Send + Sync {
    /// Publish an envelope, returning the queue's message id
    async fn publish(&self, envelope: &NotificationEnvelope) -> Result<String, QueueError>;
}

/// Consuming side of the notification queue
///
/// Delivery is at-least-once; the same envelope may be received twice.
#[async_trait]
pub trait NotificationConsumerTrait: Send + Sync {
    /// Wait for the next envelope
    ///
    /// Returns `Ok(None)` when the queue has been closed and drained, and
    /// may also return `Ok(None)` after an idle poll interval.
    async fn receive(&self) -> Result<Option<NotificationEnvelope>, QueueError>;

    /// Confirm that a received envelope has been handled
    ///
    /// Queues that redeliver unacknowledged envelopes drop it here.
    async fn ack(&self, _envelope: &NotificationEnvelope) -> Result<(), QueueError> {
        Ok(())
    }

    /// Stop taking new envelopes
    ///
    /// Envelopes already buffered stay receivable. Consumers that cannot be
    /// closed leave this as a no-op and keep reporting `is_closed() == false`.
    fn close(&self) {}

    /// Whether the queue has been closed
    fn is_closed(&self) -> bool {
        false
    }
}

/// A delivery channel backed by an external provider
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Channel served by this provider
    fn kind(&self) -> NotificationKind;

    /// Provider name used in logs
    fn provider_name(&self) -> &'static str;

    /// Hand one message to the provider
    ///
    /// Provider failures are reported as [`DeliveryOutcome::Failed`], never
    /// as a panic or an error type.
    async fn send(&self, recipient: &str, message: &str, options: &DeliveryOptions) -> DeliveryOutcome;
}
