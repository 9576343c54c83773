//! Unit tests for the OTP service

use chrono::Duration;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::domain::entities::notification::NotificationKind;
use crate::errors::{DomainError, ValidationError};
use crate::services::otp::{
    otp_notification, InMemoryOtpStore, InMemoryVerifyRateLimiter, OtpService, OtpServiceConfig,
    RateLimitPolicy,
};

use super::mocks::{FailingLimiter, FlakyOtpStore, SlowOtpStore};

type MemoryService = OtpService<InMemoryOtpStore, InMemoryVerifyRateLimiter>;

fn fast_config() -> OtpServiceConfig {
    OtpServiceConfig {
        issue_retry_delay: std::time::Duration::from_millis(1),
        ..Default::default()
    }
}

fn memory_service(config: OtpServiceConfig, max_attempts: u32) -> (MemoryService, Arc<InMemoryOtpStore>) {
    let store = Arc::new(InMemoryOtpStore::new());
    let limiter = Arc::new(InMemoryVerifyRateLimiter::new(RateLimitPolicy::new(
        max_attempts,
        std::time::Duration::from_secs(300),
    )));
    (OtpService::new(store.clone(), limiter, config), store)
}

#[tokio::test]
async fn test_issue_then_verify_is_single_use() {
    let (service, store) = memory_service(fast_config(), 5);

    let issued = service.issue("alice").await.unwrap();
    assert_eq!(issued.code.len(), 6);
    assert!(store.contains("alice"));

    assert!(service.verify("alice", &issued.code).await.unwrap());
    assert!(!service.verify("alice", &issued.code).await.unwrap());
    assert!(!store.contains("alice"));

    let metrics = service.metrics().snapshot();
    assert_eq!(metrics.issued, 1);
    assert_eq!(metrics.verified, 1);
    assert_eq!(metrics.rejected_not_found, 1);
}

#[tokio::test]
async fn test_mismatch_does_not_consume() {
    let (service, _store) = memory_service(fast_config(), 5);

    let issued = service.issue("alice").await.unwrap();
    let wrong = if issued.code == "000000" { "111111" } else { "000000" };

    assert!(!service.verify("alice", wrong).await.unwrap());
    assert!(service.verify("alice", &issued.code).await.unwrap());
    assert_eq!(service.metrics().snapshot().rejected_mismatch, 1);
}

#[tokio::test]
async fn test_expired_code_fails_and_is_removed() {
    let config = OtpServiceConfig {
        ttl: Duration::milliseconds(50),
        ..fast_config()
    };
    let (service, store) = memory_service(config, 5);

    let issued = service.issue("alice").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(120)).await;

    assert!(!service.verify("alice", &issued.code).await.unwrap());
    assert!(!store.contains("alice"));
    assert_eq!(service.metrics().snapshot().rejected_expired, 1);

    // A fresh cycle behaves as new
    let fresh = service.issue("alice").await.unwrap();
    assert!(service.verify("alice", &fresh.code).await.unwrap());
}

#[tokio::test]
async fn test_reissue_invalidates_previous_code() {
    let (service, _store) = memory_service(fast_config(), 5);

    let first = service.issue("alice").await.unwrap();
    let mut second = service.issue("alice").await.unwrap();
    // Rare identical draw: keep issuing until the codes differ
    while second.code == first.code {
        second = service.issue("alice").await.unwrap();
    }

    assert!(!service.verify("alice", &first.code).await.unwrap());
    assert!(service.verify("alice", &second.code).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_parallel_verify_exactly_one_succeeds() {
    let (service, _store) = memory_service(fast_config(), 1000);
    let service = Arc::new(service);
    let issued = service.issue("alice").await.unwrap();

    let barrier = Arc::new(tokio::sync::Barrier::new(32));
    let handles: Vec<_> = (0..32)
        .map(|_| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let code = issued.code.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                service.verify("alice", &code).await.unwrap()
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    let metrics = service.metrics().snapshot();
    assert_eq!(metrics.verified, 1);
    assert_eq!(metrics.rejected_total(), 31);
}

#[tokio::test]
async fn test_verify_store_unavailable_is_distinguished() {
    let store = Arc::new(FlakyOtpStore::new(0));
    let limiter = Arc::new(InMemoryVerifyRateLimiter::default());
    let service = OtpService::new(store.clone(), limiter, fast_config());

    let issued = service.issue("alice").await.unwrap();
    store.fail_consume(true);

    let result = service.verify("alice", &issued.code).await;
    assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));
    // Never retried on verify
    assert_eq!(store.consume_calls.load(Ordering::SeqCst), 1);

    // The record survived, so the code still works once the store is back
    store.fail_consume(false);
    assert!(service.verify("alice", &issued.code).await.unwrap());
}

#[tokio::test]
async fn test_issue_retries_transient_store_failures() {
    let store = Arc::new(FlakyOtpStore::new(2));
    let limiter = Arc::new(InMemoryVerifyRateLimiter::default());
    let service = OtpService::new(store.clone(), limiter, fast_config());

    let issued = service.issue("alice").await.unwrap();
    assert_eq!(store.put_calls.load(Ordering::SeqCst), 3);
    assert_eq!(service.metrics().snapshot().issue_retries, 2);
    assert!(service.verify("alice", &issued.code).await.unwrap());
}

#[tokio::test]
async fn test_issue_gives_up_after_retries() {
    let store = Arc::new(FlakyOtpStore::new(10));
    let limiter = Arc::new(InMemoryVerifyRateLimiter::default());
    let service = OtpService::new(store.clone(), limiter, fast_config());

    let result = service.issue("alice").await;
    assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));
    assert_eq!(store.put_calls.load(Ordering::SeqCst), 3);
    assert_eq!(service.metrics().snapshot().store_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn test_store_timeout_is_store_unavailable() {
    let store = Arc::new(SlowOtpStore {
        delay: std::time::Duration::from_secs(30),
    });
    let limiter = Arc::new(InMemoryVerifyRateLimiter::default());
    let config = OtpServiceConfig {
        store_timeout: std::time::Duration::from_millis(50),
        issue_retries: 0,
        ..fast_config()
    };
    let service = OtpService::new(store, limiter, config);

    match service.verify("alice", "123456").await {
        Err(DomainError::StoreUnavailable { message }) => assert!(message.contains("timed out")),
        other => panic!("Expected StoreUnavailable, got {:?}", other),
    }
    assert!(matches!(
        service.issue("alice").await,
        Err(DomainError::StoreUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_limiter_failure_is_store_unavailable() {
    let store = Arc::new(InMemoryOtpStore::new());
    let service = OtpService::new(store, Arc::new(FailingLimiter), fast_config());

    let issued = service.issue("alice").await.unwrap();
    let result = service.verify("alice", &issued.code).await;
    assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));
}

#[tokio::test]
async fn test_validation_happens_before_store() {
    let store = Arc::new(FlakyOtpStore::new(0));
    let limiter = Arc::new(InMemoryVerifyRateLimiter::default());
    let service = OtpService::new(store.clone(), limiter, fast_config());

    match service.verify("alice", "12345").await {
        Err(DomainError::Validation(ValidationError::InvalidLength { expected, actual, .. })) => {
            assert_eq!(expected, 6);
            assert_eq!(actual, 5);
        }
        other => panic!("Expected length validation error, got {:?}", other),
    }
    assert!(matches!(
        service.verify("alice", "12a456").await,
        Err(DomainError::Validation(ValidationError::InvalidFormat { .. }))
    ));
    assert!(matches!(
        service.verify("   ", "123456").await,
        Err(DomainError::Validation(ValidationError::RequiredField { .. }))
    ));
    assert!(matches!(
        service.issue("bad\u{0}id").await,
        Err(DomainError::Validation(ValidationError::InvalidFormat { .. }))
    ));

    assert_eq!(store.consume_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rate_limit_blocks_guessing() {
    let (service, _store) = memory_service(fast_config(), 3);
    let issued = service.issue("alice").await.unwrap();
    let wrong = if issued.code == "000000" { "111111" } else { "000000" };

    for _ in 0..3 {
        assert!(!service.verify("alice", wrong).await.unwrap());
    }

    // Even the right code is refused once the budget is spent
    assert!(matches!(
        service.verify("alice", &issued.code).await,
        Err(DomainError::RateLimitExceeded { .. })
    ));
    assert_eq!(service.metrics().snapshot().rate_limited, 1);
}

#[tokio::test]
async fn test_successful_verify_resets_budget() {
    let (service, _store) = memory_service(fast_config(), 2);

    let issued = service.issue("alice").await.unwrap();
    let wrong = if issued.code == "000000" { "111111" } else { "000000" };
    assert!(!service.verify("alice", wrong).await.unwrap());
    assert!(service.verify("alice", &issued.code).await.unwrap());

    let next = service.issue("alice").await.unwrap();
    let wrong = if next.code == "000000" { "111111" } else { "000000" };
    assert!(!service.verify("alice", wrong).await.unwrap());
    assert!(service.verify("alice", &next.code).await.unwrap());
}

#[tokio::test]
async fn test_sweep_expired() {
    let config = OtpServiceConfig {
        ttl: Duration::milliseconds(20),
        ..fast_config()
    };
    let (service, store) = memory_service(config, 5);

    service.issue("alice").await.unwrap();
    service.issue("bob").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(60)).await;

    assert_eq!(service.sweep_expired().await.unwrap(), 2);
    assert!(store.is_empty());
    assert_eq!(service.metrics().snapshot().swept, 2);
}

#[tokio::test]
async fn test_oversized_configured_ttl_is_capped() {
    let otp_config = ns_shared::config::OtpConfig {
        ttl_minutes: i64::MAX,
        ..Default::default()
    };
    let config = OtpServiceConfig::from(&otp_config);
    assert_eq!(config.ttl, Duration::minutes(ns_shared::config::otp::MAX_TTL_MINUTES));

    let (service, _store) = memory_service(config, 5);
    let issued = service.issue("alice").await.unwrap();
    assert!(service.verify("alice", &issued.code).await.unwrap());
}

#[test]
fn test_otp_notification_message() {
    let request = otp_notification(NotificationKind::Sms, "+14155550123", "123456", Duration::minutes(5));

    assert_eq!(request.kind, NotificationKind::Sms);
    assert_eq!(request.recipient, "+14155550123");
    assert!(request.message.contains("123456"));
    assert!(request.message.contains("5 minutes"));
    assert_eq!(request.metadata["purpose"], "otp");

    let single = otp_notification(NotificationKind::Email, "a@example.com", "123456", Duration::seconds(30));
    assert!(single.message.contains("1 minute."));
}
