//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use ns_api::state::{SharedDispatchGateway, SharedOtpService};
use ns_api::AppState;
use ns_core::domain::{NotificationKind, OtpRecord};
use ns_core::errors::StoreError;
use ns_core::services::{
    ConsumeOutcome, DeliveryWorker, DispatchGateway, InMemoryOtpStore, InMemoryVerifyRateLimiter,
    NotificationConsumerTrait, NotificationQueueTrait, OtpService, OtpServiceConfig, OtpStoreTrait,
    RateLimitPolicy, VerifyRateLimiterTrait,
};
use ns_infra::providers::LoggingProvider;
use ns_infra::queue::ChannelNotificationQueue;

/// Initialise the test service with the full route table
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .app_data(ns_api::json_config())
                .configure(ns_api::configure),
        )
        .await
    };
}

pub(crate) use init_app;

pub struct TestContext {
    pub state: AppState,
    pub queue: Arc<ChannelNotificationQueue>,
}

/// Store that is always down
pub struct UnavailableStore;

#[async_trait]
impl OtpStoreTrait for UnavailableStore {
    async fn put(&self, _record: &OtpRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn try_consume(
        &self,
        _identifier: &str,
        _code: &str,
        _now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, StoreError> {
        Ok(0)
    }
}

fn fast_config() -> OtpServiceConfig {
    OtpServiceConfig {
        issue_retry_delay: Duration::from_millis(1),
        ..Default::default()
    }
}

fn build_context(store: Arc<dyn OtpStoreTrait>, max_attempts: u32, capacity: usize) -> TestContext {
    let limiter: Arc<dyn VerifyRateLimiterTrait> = Arc::new(InMemoryVerifyRateLimiter::new(
        RateLimitPolicy::new(max_attempts, Duration::from_secs(300)),
    ));
    let otp_service: Arc<SharedOtpService> = Arc::new(OtpService::new(store, limiter, fast_config()));

    let queue = Arc::new(ChannelNotificationQueue::new(capacity));
    let publisher: Arc<dyn NotificationQueueTrait> = queue.clone();
    let dispatch: Arc<SharedDispatchGateway> =
        Arc::new(DispatchGateway::new(publisher, "notifications-topic"));

    let worker = DeliveryWorker::builder()
        .register(Arc::new(LoggingProvider::new(NotificationKind::Sms)))
        .register(Arc::new(LoggingProvider::new(NotificationKind::Email)))
        .build();

    TestContext {
        state: AppState::new("test-service", otp_service, dispatch, Arc::new(worker)),
        queue,
    }
}

pub fn test_context() -> TestContext {
    build_context(Arc::new(InMemoryOtpStore::new()), 5, 16)
}

pub fn test_context_with_attempts(max_attempts: u32) -> TestContext {
    build_context(Arc::new(InMemoryOtpStore::new()), max_attempts, 16)
}

pub fn test_context_with_capacity(capacity: usize) -> TestContext {
    build_context(Arc::new(InMemoryOtpStore::new()), 5, capacity)
}

pub fn unavailable_store_context() -> TestContext {
    build_context(Arc::new(UnavailableStore), 5, 16)
}

/// Pull the passcode out of a delivered OTP message
pub async fn delivered_code(queue: &ChannelNotificationQueue) -> String {
    let envelope = queue
        .receive()
        .await
        .expect("queue receive")
        .expect("an OTP notification was queued");
    envelope
        .message
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(6)
        .collect()
}
