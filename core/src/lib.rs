//! # Notification Service Core
//!
//! Domain layer of the notification service.
//! This crate contains the OTP lifecycle engine (passcode generation, storage
//! contract, atomic verification), the notification dispatch gateway, the
//! delivery worker and the error types shared by every layer above it.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
