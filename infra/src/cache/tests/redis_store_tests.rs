//! Redis-backed OTP store and limiter tests (require a running Redis)

use chrono::{Duration, Utc};
use std::sync::Arc;

use ns_core::domain::OtpRecord;
use ns_core::services::{
    ConsumeOutcome, OtpStoreTrait, RateLimitPolicy, VerifyRateLimiterTrait,
};
use ns_shared::config::CacheConfig;

use crate::cache::{RedisClient, RedisOtpStore, RedisVerifyRateLimiter};

async fn client() -> Arc<RedisClient> {
    let config = CacheConfig::new(
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
    )
    .with_prefix(format!("ns_test_{}", uuid::Uuid::new_v4()));
    Arc::new(RedisClient::new(config).await.unwrap())
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_consume_lifecycle() {
    let store = RedisOtpStore::new(client().await, "otps");
    let record = OtpRecord::new("alice", "012345", Utc::now(), Duration::minutes(5));
    store.put(&record).await.unwrap();

    assert_eq!(
        store.try_consume("alice", "999999", Utc::now()).await.unwrap(),
        ConsumeOutcome::Mismatch
    );
    assert_eq!(
        store.try_consume("alice", "012345", Utc::now()).await.unwrap(),
        ConsumeOutcome::Success
    );
    assert_eq!(
        store.try_consume("alice", "012345", Utc::now()).await.unwrap(),
        ConsumeOutcome::NotFound
    );
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_code_sharing_a_prefix_is_a_mismatch() {
    let store = RedisOtpStore::new(client().await, "otps");
    let record = OtpRecord::new("alice", "123456", Utc::now(), Duration::minutes(5));
    store.put(&record).await.unwrap();

    for near_miss in ["123457", "023456", "12345 "] {
        assert_eq!(
            store.try_consume("alice", near_miss, Utc::now()).await.unwrap(),
            ConsumeOutcome::Mismatch
        );
    }
    assert_eq!(
        store.try_consume("alice", "123456", Utc::now()).await.unwrap(),
        ConsumeOutcome::Success
    );
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_expired_record_is_deleted() {
    let store = RedisOtpStore::new(client().await, "otps");
    let record = OtpRecord::new("bob", "123456", Utc::now(), Duration::minutes(5));
    store.put(&record).await.unwrap();

    let later = record.expires_at + Duration::seconds(1);
    assert_eq!(
        store.try_consume("bob", "123456", later).await.unwrap(),
        ConsumeOutcome::Expired
    );
    assert_eq!(
        store.try_consume("bob", "123456", Utc::now()).await.unwrap(),
        ConsumeOutcome::NotFound
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Requires actual Redis server
async fn test_concurrent_consume_single_winner() {
    let store = Arc::new(RedisOtpStore::new(client().await, "otps"));
    let record = OtpRecord::new("carol", "424242", Utc::now(), Duration::minutes(5));
    store.put(&record).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.try_consume("carol", "424242", Utc::now()).await.unwrap() })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() == ConsumeOutcome::Success {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_limiter_window() {
    let limiter = RedisVerifyRateLimiter::new(
        client().await,
        RateLimitPolicy::new(2, std::time::Duration::from_secs(60)),
    );

    assert!(limiter.record_attempt("dave").await.unwrap().allowed);
    assert!(limiter.record_attempt("dave").await.unwrap().allowed);
    let blocked = limiter.record_attempt("dave").await.unwrap();
    assert!(!blocked.allowed);
    assert!(blocked.retry_after_seconds <= 60);

    limiter.reset("dave").await.unwrap();
    assert!(limiter.record_attempt("dave").await.unwrap().allowed);
}
