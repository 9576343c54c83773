//! Business services containing domain logic and use cases.

pub mod notification;
pub mod otp;

// Re-export commonly used types
pub use notification::{
    decode_push_payload, DeliveryWorker, DeliveryWorkerBuilder, DispatchGateway,
    NotificationConsumerTrait, NotificationProvider, NotificationQueueTrait, PushMessage,
    WorkerAck,
};
pub use otp::{
    otp_notification, ConsumeOutcome, InMemoryOtpStore, InMemoryVerifyRateLimiter, IssuedOtp,
    OtpMetrics, OtpMetricsSnapshot, OtpService, OtpServiceConfig, OtpStoreTrait,
    PasscodeGenerator, RateLimitPolicy, RateLimitStatus, RejectionReason,
    VerifyRateLimiterTrait,
};
