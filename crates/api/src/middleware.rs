//! API middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use cirs_auth::{TokenVerifier, bearer_token};
use cirs_core::{IdentityEventService, ReportService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
    pub user_service: UserService,
    pub identity_event_service: IdentityEventService,
    pub verifier: Arc<TokenVerifier>,
    /// Shared secret for identity webhook deliveries, when configured.
    pub webhook_secret: Option<String>,
}

/// Authentication middleware.
///
/// Verifies the bearer token when present and stores the claims in request
/// extensions. Routes that require a caller reject through the `AuthUser`
/// extractor, so public routes stay reachable without a token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Ok(token) = bearer_token(req.headers()) {
        match state.verifier.verify(&token).await {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
            }
            Err(err) => {
                tracing::debug!(error = %err, "Bearer token rejected");
            }
        }
    }

    next.run(req).await
}
