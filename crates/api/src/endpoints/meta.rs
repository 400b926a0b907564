//! Health and public metadata endpoints.

use axum::{Json, Router, routing::get};
use cirs_core::Testimonial;
use serde::Serialize;

use crate::middleware::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Liveness probe.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Curated landing-page testimonials.
async fn testimonials() -> Json<Vec<Testimonial>> {
    Json(Testimonial::all())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/testimonials", get(testimonials))
}
