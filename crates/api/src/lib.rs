//! HTTP API layer for CIRS.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: report lifecycle, admin dashboard, user profiles,
//!   identity webhooks, health and testimonials
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: token verification feeding request extensions
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;

pub use endpoints::router;
pub use middleware::AppState;
