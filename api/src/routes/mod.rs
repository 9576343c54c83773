//! Route handlers
//!
//! - `health` - liveness probe
//! - `notify` - enqueue a notification
//! - `otp` - issue and verify passcodes
//! - `worker` - push-subscription delivery endpoint

pub mod health;
pub mod notify;
pub mod otp;
pub mod worker;
