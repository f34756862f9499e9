//! Axum HTTP surface and the polling-driven job progress engine.
//!
//! This crate provides:
//! - the three summary endpoints (create, poll, cancel)
//! - request validation, rate-limit accounting and the error envelope
//! - the stage driver that advances jobs inside GET polls

pub mod config;
pub mod driver;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ProviderConfig, TtlConfig};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
