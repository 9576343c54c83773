//! Redis queue tests (require a running Redis)

use redis::AsyncCommands;
use std::sync::Arc;

use ns_core::domain::{NotificationEnvelope, NotificationKind, NotificationRequest};
use ns_core::services::{NotificationConsumerTrait, NotificationQueueTrait};
use ns_shared::config::CacheConfig;

use crate::cache::RedisClient;
use crate::queue::RedisNotificationQueue;

const TOPIC: &str = "notifications-topic";

async fn client() -> Arc<RedisClient> {
    let config = CacheConfig::new(
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
    )
    .with_prefix(format!("ns_test_{}", uuid::Uuid::new_v4()));
    Arc::new(RedisClient::new(config).await.unwrap())
}

fn sms(recipient: &str) -> NotificationEnvelope {
    NotificationEnvelope::from_request(NotificationRequest::new(
        NotificationKind::Sms,
        recipient,
        "hello",
    ))
}

async fn list_len(client: &RedisClient, key: &str) -> i64 {
    let mut conn = client.get_connection();
    conn.llen(key).await.unwrap()
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_publish_then_receive_fifo() {
    let queue = RedisNotificationQueue::new(client().await, TOPIC, 1);
    assert!(queue.key().ends_with("queue:notifications-topic"));

    let first = NotificationEnvelope::from_request(
        NotificationRequest::new(NotificationKind::Email, "a@example.com", "one")
            .with_metadata("subject", "Hi"),
    );
    let second = sms("+14155550123");

    assert_eq!(queue.publish(&first).await.unwrap(), first.id);
    queue.publish(&second).await.unwrap();

    assert_eq!(queue.receive().await.unwrap(), Some(first));
    assert_eq!(queue.receive().await.unwrap(), Some(second));
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_receive_times_out_with_none() {
    let queue = RedisNotificationQueue::new(client().await, TOPIC, 1);
    assert_eq!(queue.receive().await.unwrap(), None);
    assert!(!queue.is_closed());
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_ack_clears_processing_list() {
    let client = client().await;
    let queue = RedisNotificationQueue::new(Arc::clone(&client), TOPIC, 1);
    let envelope = sms("+14155550123");
    queue.publish(&envelope).await.unwrap();

    let received = queue.receive().await.unwrap().unwrap();
    assert_eq!(list_len(&client, queue.processing_key()).await, 1);

    queue.ack(&received).await.unwrap();
    assert_eq!(list_len(&client, queue.processing_key()).await, 0);
    assert_eq!(queue.recover_in_flight().await.unwrap(), 0);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_unacknowledged_envelope_survives_consumer_stop() {
    let client = client().await;
    let first = sms("+14155550001");
    let second = sms("+14155550002");

    {
        let queue = RedisNotificationQueue::new(Arc::clone(&client), TOPIC, 1);
        queue.publish(&first).await.unwrap();
        queue.publish(&second).await.unwrap();
        // Popped, never acknowledged
        assert_eq!(queue.receive().await.unwrap(), Some(first.clone()));
    }

    let restarted = RedisNotificationQueue::new(Arc::clone(&client), TOPIC, 1);
    assert_eq!(restarted.recover_in_flight().await.unwrap(), 1);
    assert_eq!(list_len(&client, restarted.processing_key()).await, 0);

    // The recovered envelope comes back ahead of the one still queued
    assert_eq!(restarted.receive().await.unwrap(), Some(first));
    assert_eq!(restarted.receive().await.unwrap(), Some(second));
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_closed_queue_leaves_messages_queued() {
    let client = client().await;
    let queue = RedisNotificationQueue::new(Arc::clone(&client), TOPIC, 1);
    queue.publish(&sms("+14155550123")).await.unwrap();

    queue.close();
    assert!(queue.is_closed());
    assert_eq!(queue.receive().await.unwrap(), None);
    assert_eq!(list_len(&client, queue.key()).await, 1);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_undecodable_entry_is_discarded() {
    let client = client().await;
    let queue = RedisNotificationQueue::new(Arc::clone(&client), TOPIC, 1);
    let mut conn = client.get_connection();
    conn.lpush::<_, _, ()>(queue.key(), "not json").await.unwrap();

    assert!(queue.receive().await.is_err());
    assert_eq!(list_len(&client, queue.processing_key()).await, 0);
}
