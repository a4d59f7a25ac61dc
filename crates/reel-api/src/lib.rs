//! Axum HTTP API server.
//!
//! This crate provides:
//! - Account, catalog and generated-video endpoints
//! - Credit-billed hook generation backed by a chat completion API
//! - Stripe checkout, customer portal and signed webhook handling
//! - Bearer token auth, per-IP rate limiting and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
