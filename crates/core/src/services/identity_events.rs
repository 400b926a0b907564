//! Identity-provider lifecycle webhooks.
//!
//! The provider signs deliveries with HMAC-SHA256 over
//! `"{id}.{timestamp}.{payload}"` using a `whsec_`-prefixed base64 secret,
//! and sends the result as space-separated `v1,<base64>` entries in the
//! signature header. Verification happens on the raw body, before any
//! parsing.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use cirs_auth::Claims;
use cirs_common::{AppError, AppResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::services::user::UserService;

type HmacSha256 = Hmac<Sha256>;

/// Maximum clock skew accepted on the delivery timestamp.
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Verify a webhook delivery signature.
///
/// `secret` is the `whsec_`-prefixed shared secret, `timestamp` is the unix
/// seconds from the delivery headers, and `signatures` is the raw signature
/// header value.
pub fn verify_webhook_signature(
    secret: &str,
    msg_id: &str,
    timestamp: &str,
    signatures: &str,
    payload: &[u8],
) -> AppResult<()> {
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid webhook timestamp".to_string()))?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(AppError::BadRequest(
            "Webhook timestamp outside tolerance".to_string(),
        ));
    }

    let key = secret.strip_prefix("whsec_").unwrap_or(secret);
    let key = BASE64
        .decode(key)
        .map_err(|_| AppError::Config("Invalid webhook secret".to_string()))?;

    for entry in signatures.split_whitespace() {
        let Some(candidate) = entry.strip_prefix("v1,") else {
            continue;
        };
        let Ok(candidate) = BASE64.decode(candidate) else {
            continue;
        };

        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|_| AppError::Config("Invalid webhook secret".to_string()))?;
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        if mac.verify_slice(&candidate).is_ok() {
            return Ok(());
        }
    }

    Err(AppError::BadRequest(
        "Webhook signature mismatch".to_string(),
    ))
}

/// A parsed identity-provider lifecycle event.
#[derive(Debug, Clone)]
pub enum IdentityEvent {
    Created(IdentityUser),
    Updated(IdentityUser),
    Deleted { id: String },
}

/// User payload carried by created/updated events.
#[derive(Debug, Clone)]
pub struct IdentityUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl IdentityEvent {
    /// Parse an event from a raw delivery payload. Unrecognized event types
    /// parse as `None` so the provider can add types without breaking us.
    pub fn parse(payload: &[u8]) -> AppResult<Option<Self>> {
        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|_| AppError::BadRequest("Invalid webhook payload".to_string()))?;

        let event_type = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| AppError::BadRequest("Webhook payload missing type".to_string()))?;
        let data = value
            .get("data")
            .ok_or_else(|| AppError::BadRequest("Webhook payload missing data".to_string()))?;
        let id = data
            .get("id")
            .and_then(|i| i.as_str())
            .ok_or_else(|| AppError::BadRequest("Webhook payload missing user id".to_string()))?
            .to_string();

        let event = match event_type {
            "user.created" => Some(Self::Created(Self::parse_user(id, data))),
            "user.updated" => Some(Self::Updated(Self::parse_user(id, data))),
            "user.deleted" => Some(Self::Deleted { id }),
            _ => None,
        };
        Ok(event)
    }

    fn parse_user(id: String, data: &serde_json::Value) -> IdentityUser {
        let email = data
            .get("email_addresses")
            .and_then(|a| a.get(0))
            .and_then(|e| e.get("email_address"))
            .and_then(|e| e.as_str())
            .map(str::to_string);
        IdentityUser {
            id,
            email,
            first_name: string_field(data, "first_name"),
            last_name: string_field(data, "last_name"),
        }
    }
}

fn string_field(data: &serde_json::Value, key: &str) -> Option<String> {
    data.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Service applying identity lifecycle events to the mirrored user table.
#[derive(Clone)]
pub struct IdentityEventService {
    user_service: UserService,
    user_repo: cirs_db::repositories::UserRepository,
}

impl IdentityEventService {
    /// Create a new identity event service.
    #[must_use]
    pub const fn new(
        user_service: UserService,
        user_repo: cirs_db::repositories::UserRepository,
    ) -> Self {
        Self {
            user_service,
            user_repo,
        }
    }

    /// Apply one event to the mirror.
    pub async fn handle(&self, event: IdentityEvent) -> AppResult<()> {
        match event {
            IdentityEvent::Created(user) | IdentityEvent::Updated(user) => {
                self.upsert(user).await
            }
            IdentityEvent::Deleted { id } => {
                let removed = self.user_repo.delete_by_id(&id).await?;
                if removed == 0 {
                    tracing::debug!(user_id = %id, "Delete event for unknown user");
                } else {
                    tracing::info!(user_id = %id, "User removed by identity event");
                }
                Ok(())
            }
        }
    }

    /// Create or refresh the mirror row for a provider user.
    ///
    /// Created and updated events are applied identically: deliveries can
    /// arrive out of order, and a row may already exist from lazy creation.
    async fn upsert(&self, user: IdentityUser) -> AppResult<()> {
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: None,
        };
        let existing = self.user_service.get_or_create(&claims).await?;

        let changed = user.email.as_ref().is_some_and(|e| *e != existing.email)
            || user
                .first_name
                .as_ref()
                .is_some_and(|n| *n != existing.first_name)
            || user
                .last_name
                .as_ref()
                .is_some_and(|n| *n != existing.last_name);
        if !changed {
            return Ok(());
        }

        let mut model: cirs_db::entities::user::ActiveModel = existing.into();
        if let Some(email) = user.email {
            model.email = sea_orm::Set(email);
        }
        if let Some(first_name) = user.first_name {
            model.first_name = sea_orm::Set(first_name);
        }
        if let Some(last_name) = user.last_name {
            model.last_name = sea_orm::Set(last_name);
        }
        self.user_repo.update(model).await?;
        tracing::info!(user_id = %user.id, "User refreshed by identity event");
        Ok(())
    }
}
