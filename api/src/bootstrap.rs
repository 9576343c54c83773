//! Process wiring: turns an [`AppConfig`] into running services
//!
//! Backends are picked at runtime from configuration. Redis is only
//! contacted when at least one backend asks for it.

use std::sync::Arc;
use std::time::Duration;

use ns_core::services::{
    DispatchGateway, InMemoryOtpStore, InMemoryVerifyRateLimiter, NotificationConsumerTrait,
    NotificationQueueTrait, OtpService, OtpServiceConfig, OtpStoreTrait, RateLimitPolicy,
    VerifyRateLimiterTrait,
};
use ns_infra::cache::{RedisClient, RedisOtpStore, RedisVerifyRateLimiter};
use ns_infra::providers::build_delivery_worker;
use ns_infra::queue::{ChannelNotificationQueue, RedisNotificationQueue};
use ns_infra::InfrastructureError;
use ns_shared::config::{AppConfig, QueueBackend, StoreBackend};

use crate::state::AppState;

/// Everything the binary needs after wiring
pub struct Services {
    pub state: AppState,
    /// Queue consumer for the embedded delivery loop, if one should run
    pub consumer: Option<Arc<dyn NotificationConsumerTrait>>,
    /// In-process limiter whose stale windows the sweep task purges
    pub memory_limiter: Option<Arc<InMemoryVerifyRateLimiter>>,
}

/// Build the application services from configuration
///
/// # Arguments
/// * `config` - Application configuration
///
/// # Returns
/// * `Result<Services, InfrastructureError>` - Wired services or a backend error
pub async fn build_services(config: &AppConfig) -> Result<Services, InfrastructureError> {
    let needs_redis =
        config.otp.backend == StoreBackend::Redis || config.queue.backend == QueueBackend::Redis;
    let redis = if needs_redis {
        Some(Arc::new(RedisClient::new(config.cache.clone()).await?))
    } else {
        None
    };

    let policy = RateLimitPolicy::new(
        config.otp.max_verify_attempts,
        Duration::from_secs(config.otp.verify_window_seconds),
    );

    let mut memory_limiter = None;
    let (store, limiter): (Arc<dyn OtpStoreTrait>, Arc<dyn VerifyRateLimiterTrait>) =
        match (config.otp.backend, &redis) {
            (StoreBackend::Redis, Some(client)) => (
                Arc::new(RedisOtpStore::new(Arc::clone(client), &config.otp.collection)),
                Arc::new(RedisVerifyRateLimiter::new(Arc::clone(client), policy)),
            ),
            _ => {
                let limiter = Arc::new(InMemoryVerifyRateLimiter::new(policy));
                memory_limiter = Some(Arc::clone(&limiter));
                (Arc::new(InMemoryOtpStore::new()), limiter)
            }
        };

    let run_consumer = match config.queue.backend {
        QueueBackend::Memory if !config.queue.embedded_worker => {
            tracing::warn!("In-memory queue needs the embedded worker, enabling it");
            true
        }
        QueueBackend::Memory => true,
        QueueBackend::Redis => config.queue.embedded_worker,
    };

    let (queue, consumer): (Arc<dyn NotificationQueueTrait>, Arc<dyn NotificationConsumerTrait>) =
        match (config.queue.backend, &redis) {
            (QueueBackend::Redis, Some(client)) => {
                let queue = Arc::new(RedisNotificationQueue::new(
                    Arc::clone(client),
                    &config.queue.topic,
                    config.queue.poll_timeout_seconds,
                ));
                if run_consumer {
                    queue.recover_in_flight().await?;
                }
                (queue.clone(), queue)
            }
            _ => {
                let queue = Arc::new(ChannelNotificationQueue::new(config.queue.capacity));
                (queue.clone(), queue)
            }
        };

    let otp_service = OtpService::new(store, limiter, OtpServiceConfig::from(&config.otp));
    let dispatch = DispatchGateway::new(queue, config.queue.topic_path(&config.project_id));
    let worker = build_delivery_worker(&config.providers)?;

    tracing::info!(
        otp_backend = ?config.otp.backend,
        queue_backend = ?config.queue.backend,
        topic = %dispatch.topic(),
        embedded_worker = run_consumer,
        "Services wired"
    );

    Ok(Services {
        state: AppState::new(
            config.app_name.clone(),
            Arc::new(otp_service),
            Arc::new(dispatch),
            Arc::new(worker),
        ),
        consumer: run_consumer.then_some(consumer),
        memory_limiter,
    })
}
