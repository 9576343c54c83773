//! Tests for the in-process channel queue

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use ns_core::domain::{NotificationEnvelope, NotificationKind, NotificationRequest};
use ns_core::services::{DeliveryWorker, NotificationConsumerTrait, NotificationQueueTrait};

use crate::providers::LoggingProvider;
use crate::queue::ChannelNotificationQueue;
use crate::QueueError;

fn envelope(recipient: &str) -> NotificationEnvelope {
    NotificationEnvelope::from_request(NotificationRequest::new(
        NotificationKind::Sms,
        recipient,
        "hello",
    ))
}

#[tokio::test]
async fn test_publish_returns_envelope_id_and_preserves_order() {
    let queue = ChannelNotificationQueue::new(8);
    let first = envelope("+14155550001");
    let second = envelope("+14155550002");

    assert_eq!(queue.publish(&first).await.unwrap(), first.id);
    assert_eq!(queue.publish(&second).await.unwrap(), second.id);
    assert_eq!(queue.pending(), 2);

    assert_eq!(queue.receive().await.unwrap(), Some(first));
    assert_eq!(queue.receive().await.unwrap(), Some(second));
    assert_eq!(queue.pending(), 0);
}

#[tokio::test]
async fn test_full_queue_rejects_publish() {
    let queue = ChannelNotificationQueue::new(1);
    queue.publish(&envelope("+14155550001")).await.unwrap();

    match queue.publish(&envelope("+14155550002")).await {
        Err(QueueError::Unavailable(message)) => assert!(message.contains("full")),
        other => panic!("Expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_close_drains_then_ends() {
    let queue = ChannelNotificationQueue::new(4);
    let pending = envelope("+14155550001");
    queue.publish(&pending).await.unwrap();

    queue.close();
    assert!(queue.is_closed());
    assert!(matches!(
        queue.publish(&envelope("+14155550002")).await,
        Err(QueueError::Closed)
    ));

    assert_eq!(queue.receive().await.unwrap(), Some(pending));
    assert_eq!(queue.receive().await.unwrap(), None);
}

#[tokio::test]
async fn test_close_wakes_a_waiting_receiver() {
    let queue = Arc::new(ChannelNotificationQueue::new(4));
    let waiting = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move { queue.receive().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    queue.close();

    let received = tokio::time::timeout(Duration::from_secs(1), waiting)
        .await
        .expect("receiver still blocked after close")
        .unwrap();
    assert_eq!(received.unwrap(), None);
}

#[tokio::test]
async fn test_worker_shutdown_delivers_everything_queued() {
    let queue = Arc::new(ChannelNotificationQueue::new(16));
    for i in 0..5 {
        queue
            .publish(&envelope(&format!("+1415555000{}", i)))
            .await
            .unwrap();
    }
    let worker = DeliveryWorker::builder()
        .register(Arc::new(LoggingProvider::new(NotificationKind::Sms)))
        .build();
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    assert_eq!(worker.run(queue.as_ref(), rx).await, 5);
    assert!(queue.is_closed());
    assert_eq!(queue.pending(), 0);
}

#[test]
fn test_zero_capacity_is_clamped() {
    assert_eq!(ChannelNotificationQueue::new(0).capacity(), 1);
}
