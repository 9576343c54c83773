//! Notification queue implementations
//!
//! - [`ChannelNotificationQueue`]: bounded in-process queue, used when the
//!   delivery worker runs inside the API process
//! - [`RedisNotificationQueue`]: Redis list shared between processes

pub mod channel;
pub mod redis_queue;

#[cfg(test)]
mod tests;

pub use channel::ChannelNotificationQueue;
pub use redis_queue::RedisNotificationQueue;
