//! Redis list backed notification queue
//!
//! Publishers `LPUSH` JSON envelopes onto `queue:{topic}`. Consumers move
//! the oldest entry onto `queue:{topic}:processing` with `BLMOVE` and remove
//! it with `LREM` once the worker acknowledges it. Entries left in the
//! processing list by a stopped or crashed consumer are pushed back by
//! [`RedisNotificationQueue::recover_in_flight`], so a message may be
//! delivered twice but is not lost once published.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use ns_core::domain::NotificationEnvelope;
use ns_core::services::{NotificationConsumerTrait, NotificationQueueTrait};

use crate::cache::RedisClient;
use crate::{InfrastructureError, QueueError};

pub struct RedisNotificationQueue {
    client: Arc<RedisClient>,
    key: String,
    processing_key: String,
    poll_timeout_secs: u64,
    /// Dedicated connection for blocking pops, opened on first receive
    consumer: Mutex<Option<MultiplexedConnection>>,
    /// Raw payloads of received, unacknowledged envelopes by envelope id
    in_flight: std::sync::Mutex<HashMap<String, String>>,
    closed: AtomicBool,
}

impl RedisNotificationQueue {
    /// Create a queue on `topic`
    ///
    /// # Arguments
    /// * `client` - Shared Redis client
    /// * `topic` - Queue name; the list key is `queue:{topic}`
    /// * `poll_timeout_secs` - How long a receive blocks before returning `None`
    pub fn new(client: Arc<RedisClient>, topic: &str, poll_timeout_secs: u64) -> Self {
        let key = client.make_key(&format!("queue:{}", topic));
        let processing_key = format!("{}:processing", key);
        Self {
            client,
            key,
            processing_key,
            poll_timeout_secs: poll_timeout_secs.max(1),
            consumer: Mutex::new(None),
            in_flight: std::sync::Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn processing_key(&self) -> &str {
        &self.processing_key
    }

    /// Push entries left in the processing list back onto the queue
    ///
    /// Call once before consuming. Recovered entries are received before
    /// anything published later, oldest first.
    ///
    /// # Returns
    /// * `Result<usize, InfrastructureError>` - Number of entries requeued
    pub async fn recover_in_flight(&self) -> Result<usize, InfrastructureError> {
        let mut conn = self.client.get_connection();
        let mut recovered = 0;

        loop {
            let moved: Option<String> = redis::cmd("LMOVE")
                .arg(&self.processing_key)
                .arg(&self.key)
                .arg("LEFT")
                .arg("RIGHT")
                .query_async(&mut conn)
                .await?;
            if moved.is_none() {
                break;
            }
            recovered += 1;
        }

        if recovered > 0 {
            info!(
                recovered = recovered,
                key = %self.key,
                event = "queue_recovered",
                "Requeued unacknowledged notifications"
            );
        }
        Ok(recovered)
    }

    fn remember(&self, id: &str, payload: String) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), payload);
    }

    fn forget(&self, id: &str) -> Option<String> {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }

    async fn remove_processing(&self, payload: &str) -> Result<(), QueueError> {
        let mut conn = self.client.get_connection();
        conn.lrem::<_, _, i64>(&self.processing_key, 1, payload)
            .await
            .map(|_| ())
            .map_err(|e| QueueError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl NotificationQueueTrait for RedisNotificationQueue {
    async fn publish(&self, envelope: &NotificationEnvelope) -> Result<String, QueueError> {
        let payload =
            serde_json::to_string(envelope).map_err(|e| QueueError::Encode(e.to_string()))?;

        let mut conn = self.client.get_connection();
        conn.lpush::<_, _, ()>(&self.key, payload)
            .await
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;

        debug!(notification_id = %envelope.id, key = %self.key, "Envelope pushed to Redis queue");
        Ok(envelope.id.clone())
    }
}

#[async_trait]
impl NotificationConsumerTrait for RedisNotificationQueue {
    async fn receive(&self) -> Result<Option<NotificationEnvelope>, QueueError> {
        if self.is_closed() {
            return Ok(None);
        }

        let mut slot = self.consumer.lock().await;

        // Taken out of the slot so a cancelled receive drops the connection
        // and the server abandons the blocked command.
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => self
                .client
                .dedicated_connection()
                .await
                .map_err(|e| QueueError::Unavailable(e.to_string()))?,
        };

        let moved: Option<String> = match redis::cmd("BLMOVE")
            .arg(&self.key)
            .arg(&self.processing_key)
            .arg("RIGHT")
            .arg("LEFT")
            .arg(self.poll_timeout_secs)
            .query_async(&mut conn)
            .await
        {
            Ok(moved) => moved,
            Err(e) => {
                // Drop the connection; the next receive reconnects.
                warn!(error = %e, key = %self.key, "BLMOVE failed");
                return Err(QueueError::Unavailable(e.to_string()));
            }
        };
        *slot = Some(conn);
        drop(slot);

        let Some(payload) = moved else {
            return Ok(None);
        };

        match serde_json::from_str::<NotificationEnvelope>(&payload) {
            Ok(envelope) => {
                self.remember(&envelope.id, payload);
                Ok(Some(envelope))
            }
            Err(e) => {
                // Redelivery cannot fix an undecodable entry
                warn!(error = %e, key = %self.key, "Discarding undecodable queue entry");
                self.remove_processing(&payload).await?;
                Err(QueueError::Decode(e.to_string()))
            }
        }
    }

    async fn ack(&self, envelope: &NotificationEnvelope) -> Result<(), QueueError> {
        match self.forget(&envelope.id) {
            Some(payload) => self.remove_processing(&payload).await,
            None => Ok(()),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
