//! Shared application state handed to every handler

use std::sync::Arc;

use ns_core::services::{
    DeliveryWorker, DispatchGateway, NotificationQueueTrait, OtpService, OtpStoreTrait,
    VerifyRateLimiterTrait,
};

/// OTP engine over backends chosen at start-up
pub type SharedOtpService = OtpService<dyn OtpStoreTrait, dyn VerifyRateLimiterTrait>;

/// Dispatch gateway over the queue chosen at start-up
pub type SharedDispatchGateway = DispatchGateway<dyn NotificationQueueTrait>;

/// Application state that holds shared services
#[derive(Clone)]
pub struct AppState {
    /// Name reported by the health endpoint
    pub service_name: String,
    pub otp_service: Arc<SharedOtpService>,
    pub dispatch: Arc<SharedDispatchGateway>,
    /// Used by the push endpoint; the queue consumer loop holds its own handle
    pub worker: Arc<DeliveryWorker>,
}

impl AppState {
    pub fn new(
        service_name: impl Into<String>,
        otp_service: Arc<SharedOtpService>,
        dispatch: Arc<SharedDispatchGateway>,
        worker: Arc<DeliveryWorker>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            otp_service,
            dispatch,
            worker,
        }
    }
}
