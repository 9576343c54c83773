//! Notification module
//!
//! This module provides asynchronous notification delivery:
//! - A dispatch gateway that validates requests and enqueues them
//! - Queue and provider contracts implemented by the infrastructure layer
//! - A delivery worker that routes each queued message to the provider
//!   registered for its channel

mod dispatch;
mod traits;
mod worker;


pub use dispatch::DispatchGateway;
pub use traits::{NotificationConsumerTrait, NotificationProvider, NotificationQueueTrait};
pub use worker::{decode_push_payload, DeliveryWorker, DeliveryWorkerBuilder, PushMessage, WorkerAck};
