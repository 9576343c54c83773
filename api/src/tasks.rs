//! Background tasks running next to the HTTP server
//!
//! Both tasks stop when the shutdown channel flips to `true`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use ns_core::services::{DeliveryWorker, InMemoryVerifyRateLimiter, NotificationConsumerTrait};

use crate::state::SharedOtpService;

/// Run the delivery worker against a queue consumer
pub fn spawn_delivery_loop(
    worker: Arc<DeliveryWorker>,
    consumer: Arc<dyn NotificationConsumerTrait>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<usize> {
    tokio::spawn(async move { worker.run(consumer.as_ref(), shutdown).await })
}

/// Periodically purge expired passcodes and stale limiter windows
///
/// A zero `period` disables the sweep and no task is spawned.
pub fn spawn_expiry_sweep(
    otp_service: Arc<SharedOtpService>,
    limiter: Option<Arc<InMemoryVerifyRateLimiter>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        tracing::info!(event = "sweep_disabled", "Expiry sweep disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    if let Err(e) = otp_service.sweep_expired().await {
                        tracing::warn!(error = %e, event = "otp_sweep_failed", "Expiry sweep failed");
                    }
                    if let Some(limiter) = &limiter {
                        let purged = limiter.purge_stale();
                        if purged > 0 {
                            tracing::debug!(purged = purged, "Purged stale verify windows");
                        }
                    }
                }
            }
        }

        tracing::info!(event = "sweep_stopped", "Expiry sweep stopped");
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ns_core::services::{InMemoryOtpStore, OtpService, OtpServiceConfig, OtpStoreTrait, VerifyRateLimiterTrait};

    #[tokio::test(start_paused = true)]
    async fn test_sweep_runs_until_shutdown() {
        let store = Arc::new(InMemoryOtpStore::new());
        let limiter = Arc::new(InMemoryVerifyRateLimiter::default());
        let config = OtpServiceConfig {
            ttl: chrono::Duration::milliseconds(10),
            ..Default::default()
        };
        let store_dyn: Arc<dyn OtpStoreTrait> = store.clone();
        let limiter_dyn: Arc<dyn VerifyRateLimiterTrait> = limiter.clone();
        let service = Arc::new(OtpService::new(store_dyn, limiter_dyn, config));

        service.issue("alice").await.unwrap();

        let (tx, rx) = watch::channel(false);
        let handle = spawn_expiry_sweep(
            Arc::clone(&service),
            Some(limiter),
            Duration::from_secs(1),
            rx,
        )
        .unwrap();

        // Expiry is judged on the wall clock, so real time has to pass too.
        std::thread::sleep(std::time::Duration::from_millis(30));
        tokio::time::sleep(Duration::from_secs(2)).await;

        tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(store.is_empty());
        assert_eq!(service.metrics().snapshot().swept, 1);
    }

    #[tokio::test]
    async fn test_zero_period_disables_sweep() {
        let store: Arc<dyn OtpStoreTrait> = Arc::new(InMemoryOtpStore::new());
        let limiter: Arc<dyn VerifyRateLimiterTrait> = Arc::new(InMemoryVerifyRateLimiter::default());
        let service = Arc::new(OtpService::new(store, limiter, OtpServiceConfig::default()));
        let (_tx, rx) = watch::channel(false);

        assert!(spawn_expiry_sweep(service, None, Duration::ZERO, rx).is_none());
    }
}
