//! API endpoints.

mod admin;
mod meta;
mod reports;
mod user;
mod webhooks;

pub use reports::ReportResponse;
pub use user::UserResponse;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(meta::router())
        .nest("/reports", reports::router())
        .nest("/admin", admin::router())
        .nest("/user", user::router())
        .nest("/webhooks", webhooks::router())
}
