//! Delivery worker: routes queued notifications to providers

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

use ns_shared::masking::mask_identifier;

use crate::domain::entities::notification::{
    DeliveryOutcome, NotificationEnvelope, NotificationKind,
};
use crate::errors::QueueError;

use super::traits::{NotificationConsumerTrait, NotificationProvider};

/// Pause after a failed receive before polling again
const RECEIVE_BACKOFF: Duration = Duration::from_secs(1);

/// Notification as delivered by a push subscription
///
/// The `type` is kept as free text so unknown channels can be acknowledged
/// as unsupported instead of failing to decode.
#[derive(Debug, Clone, Deserialize)]
pub struct PushMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub recipient: String,
    pub message: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Decode the base64 JSON body of a push-subscription message
pub fn decode_push_payload(data: &str) -> Result<PushMessage, QueueError> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| QueueError::Decode(format!("invalid base64: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(|e| QueueError::Decode(format!("invalid JSON: {}", e)))
}

/// Acknowledgement for one processed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerAck {
    /// Handed to a provider; the outcome may still be a failure
    Processed(DeliveryOutcome),
    /// No provider serves this channel
    Unsupported { kind: String },
}

impl WorkerAck {
    pub fn is_processed(&self) -> bool {
        matches!(self, WorkerAck::Processed(_))
    }
}

/// Builder for [`DeliveryWorker`]
#[derive(Default)]
pub struct DeliveryWorkerBuilder {
    providers: HashMap<NotificationKind, Arc<dyn NotificationProvider>>,
}

impl DeliveryWorkerBuilder {
    /// Register a provider for its channel, replacing any earlier one
    pub fn register(mut self, provider: Arc<dyn NotificationProvider>) -> Self {
        if let Some(previous) = self.providers.insert(provider.kind(), Arc::clone(&provider)) {
            tracing::warn!(
                kind = %provider.kind(),
                replaced = previous.provider_name(),
                provider = provider.provider_name(),
                "Replacing notification provider"
            );
        }
        self
    }

    pub fn build(self) -> DeliveryWorker {
        DeliveryWorker {
            providers: self.providers,
        }
    }
}

/// Selects a provider by notification channel and invokes it
pub struct DeliveryWorker {
    providers: HashMap<NotificationKind, Arc<dyn NotificationProvider>>,
}

impl DeliveryWorker {
    pub fn builder() -> DeliveryWorkerBuilder {
        DeliveryWorkerBuilder::default()
    }

    /// Name of the provider serving `kind`, if any
    pub fn provider_for(&self, kind: NotificationKind) -> Option<&'static str> {
        self.providers.get(&kind).map(|p| p.provider_name())
    }

    /// Deliver one envelope
    ///
    /// Provider failures are logged and acknowledged; there is no retry.
    pub async fn process(&self, envelope: &NotificationEnvelope) -> WorkerAck {
        let Some(provider) = self.providers.get(&envelope.kind) else {
            tracing::warn!(
                notification_id = %envelope.id,
                kind = %envelope.kind,
                event = "notification_unsupported",
                "No provider registered for notification type"
            );
            return WorkerAck::Unsupported {
                kind: envelope.kind.to_string(),
            };
        };

        let outcome = provider
            .send(&envelope.recipient, &envelope.message, &envelope.options())
            .await;

        match &outcome {
            DeliveryOutcome::Sent { provider_message_id } => tracing::info!(
                notification_id = %envelope.id,
                kind = %envelope.kind,
                provider = provider.provider_name(),
                provider_message_id = %provider_message_id,
                recipient = %mask_identifier(&envelope.recipient),
                event = "notification_delivered",
                "Notification delivered"
            ),
            DeliveryOutcome::Failed { error_detail } => tracing::error!(
                notification_id = %envelope.id,
                kind = %envelope.kind,
                provider = provider.provider_name(),
                error = %error_detail,
                recipient = %mask_identifier(&envelope.recipient),
                event = "notification_delivery_failed",
                "Notification delivery failed"
            ),
        }

        WorkerAck::Processed(outcome)
    }

    /// Deliver a message received from a push subscription
    pub async fn process_push(&self, message: PushMessage) -> WorkerAck {
        let kind = match message.kind.parse::<NotificationKind>() {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(
                    kind = %message.kind,
                    event = "notification_unsupported",
                    "Unsupported notification type in push message"
                );
                return WorkerAck::Unsupported { kind: message.kind };
            }
        };

        let envelope = NotificationEnvelope {
            id: message.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind,
            recipient: message.recipient,
            message: message.message,
            metadata: message.metadata.unwrap_or_default(),
            enqueued_at: Utc::now(),
        };
        self.process(&envelope).await
    }

    /// Consume from `consumer` until it closes or `shutdown` flips to true
    ///
    /// On shutdown the consumer is closed and the envelopes it still holds
    /// are delivered before returning. Every handled envelope is
    /// acknowledged. Returns the number of envelopes processed.
    pub async fn run<C>(&self, consumer: &C, mut shutdown: watch::Receiver<bool>) -> usize
    where
        C: NotificationConsumerTrait + ?Sized,
    {
        let mut processed = 0;
        let mut draining = false;
        tracing::info!(event = "worker_started", "Delivery worker started");

        loop {
            if !draining && *shutdown.borrow() {
                draining = begin_drain(consumer);
                if !draining {
                    break;
                }
            }

            let received = if draining {
                consumer.receive().await
            } else {
                tokio::select! {
                    changed = shutdown.changed() => {
                        // Sender gone counts as shutdown
                        if changed.is_err() {
                            draining = begin_drain(consumer);
                            if !draining {
                                break;
                            }
                        }
                        continue;
                    }
                    received = consumer.receive() => received,
                }
            };

            match received {
                Ok(Some(envelope)) => {
                    self.process(&envelope).await;
                    if let Err(e) = consumer.ack(&envelope).await {
                        tracing::warn!(
                            notification_id = %envelope.id,
                            error = %e,
                            event = "worker_ack_failed",
                            "Failed to acknowledge notification"
                        );
                    }
                    processed += 1;
                }
                Ok(None) => {
                    if consumer.is_closed() {
                        break;
                    }
                }
                Err(e) if draining => {
                    tracing::warn!(error = %e, event = "worker_drain_failed", "Stopping drain after queue error");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, event = "worker_receive_failed", "Failed to receive from queue");
                    tokio::time::sleep(RECEIVE_BACKOFF).await;
                }
            }
        }

        tracing::info!(processed = processed, event = "worker_stopped", "Delivery worker stopped");
        processed
    }
}

/// Close the consumer; true when it can be drained
fn begin_drain<C>(consumer: &C) -> bool
where
    C: NotificationConsumerTrait + ?Sized,
{
    consumer.close();
    let closed = consumer.is_closed();
    tracing::info!(drain = closed, event = "worker_draining", "Shutdown requested, stopping intake");
    closed
}
