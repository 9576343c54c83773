//! In-process notification queue backed by a bounded tokio channel

use async_trait::async_trait;
use std::sync::RwLock;
use tokio::sync::{mpsc, Mutex};

use ns_core::domain::NotificationEnvelope;
use ns_core::services::{NotificationConsumerTrait, NotificationQueueTrait};

use crate::QueueError;

/// Bounded mpsc queue implementing both the publishing and consuming side
///
/// A full queue rejects the publish instead of waiting, so the caller sees
/// the back-pressure as a queue failure. Closing drops the only sender: the
/// receiver then yields what is still buffered and ends with `Ok(None)`.
pub struct ChannelNotificationQueue {
    /// `None` once closed
    sender: RwLock<Option<mpsc::Sender<NotificationEnvelope>>>,
    receiver: Mutex<mpsc::Receiver<NotificationEnvelope>>,
    capacity: usize,
}

impl ChannelNotificationQueue {
    /// Create a queue holding at most `capacity` pending envelopes
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender: RwLock::new(Some(sender)),
            receiver: Mutex::new(receiver),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of envelopes waiting to be received, 0 after close
    pub fn pending(&self) -> usize {
        self.sender
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or(0, |sender| self.capacity - sender.capacity())
    }
}

#[async_trait]
impl NotificationQueueTrait for ChannelNotificationQueue {
    async fn publish(&self, envelope: &NotificationEnvelope) -> Result<String, QueueError> {
        let guard = self.sender.read().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = guard.as_ref() else {
            return Err(QueueError::Closed);
        };

        match sender.try_send(envelope.clone()) {
            Ok(()) => Ok(envelope.id.clone()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(QueueError::Unavailable(format!(
                "queue is full ({} pending)",
                self.capacity
            ))),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }
}

#[async_trait]
impl NotificationConsumerTrait for ChannelNotificationQueue {
    async fn receive(&self) -> Result<Option<NotificationEnvelope>, QueueError> {
        let mut receiver = self.receiver.lock().await;
        Ok(receiver.recv().await)
    }

    fn close(&self) {
        let sender = self.sender.write().unwrap_or_else(|e| e.into_inner()).take();
        if sender.is_some() {
            tracing::info!(event = "queue_closed", "In-process notification queue closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}
