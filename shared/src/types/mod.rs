//! Type definitions shared by the HTTP surface and the services
//!
//! - `response` - API response envelope, error body and health check

pub mod response;

pub use response::{ApiResponse, ErrorResponse, HealthResponse, ResponseStatus};
