//! Identity-provider webhook endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use cirs_common::{AppError, AppResult};
use cirs_core::{IdentityEvent, verify_webhook_signature};
use serde::Serialize;

use crate::middleware::AppState;

/// Webhook delivery acknowledgement.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> AppResult<&'h str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest(format!("Missing {name} header")))
}

/// Receive an identity-provider lifecycle event.
///
/// The delivery signature is verified against the raw body before anything
/// is parsed or written.
async fn identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let secret = state
        .webhook_secret
        .as_deref()
        .ok_or_else(|| AppError::Config("Webhook secret not configured".to_string()))?;

    let msg_id = header(&headers, "svix-id")?;
    let timestamp = header(&headers, "svix-timestamp")?;
    let signatures = header(&headers, "svix-signature")?;
    verify_webhook_signature(secret, msg_id, timestamp, signatures, &body)?;

    if let Some(event) = IdentityEvent::parse(&body)? {
        state.identity_event_service.handle(event).await?;
    }

    Ok(Json(WebhookAck { received: true }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/identity", post(identity_webhook))
}
