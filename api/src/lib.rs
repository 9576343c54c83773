//! # Notification Service API
//!
//! actix-web HTTP surface of the notification service: request DTOs,
//! domain error mapping, routes, process wiring and the background tasks
//! that run next to the server.

pub mod app;
pub mod bootstrap;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod tasks;
pub mod telemetry;

pub use app::{configure, json_config};
pub use state::AppState;
