//! User profile service.
//!
//! Profiles mirror the identity provider. A row is created lazily the first
//! time an authenticated user touches their profile, so the webhook being
//! late or lost never blocks a citizen.

use cirs_auth::Claims;
use cirs_common::{AppError, AppResult};
use cirs_db::{
    entities::user::{self, UserRole},
    repositories::UserRepository,
};
use sea_orm::Set;

/// Input for a partial profile update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

/// User service mirroring identity-provider profiles.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Get the caller's profile, mirroring it from the token claims if no
    /// row exists yet.
    pub async fn get_or_create(&self, claims: &Claims) -> AppResult<user::Model> {
        if let Some(existing) = self.user_repo.find_by_id(&claims.sub).await? {
            return Ok(existing);
        }

        let model = user::ActiveModel {
            id: Set(claims.sub.clone()),
            email: Set(claims.email.clone().unwrap_or_default()),
            first_name: Set(claims.first_name.clone().unwrap_or_default()),
            last_name: Set(claims.last_name.clone().unwrap_or_default()),
            address: Set(None),
            phone_number: Set(None),
            role: Set(role_from_claims(claims)),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, "Mirrored new user profile");
        Ok(created)
    }

    /// Update the caller's profile, creating the mirror row first if needed.
    pub async fn update_profile(
        &self,
        claims: &Claims,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        let existing = self.get_or_create(claims).await?;
        let mut model: user::ActiveModel = existing.into();

        if let Some(first_name) = input.first_name {
            model.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = input.last_name {
            model.last_name = Set(last_name.trim().to_string());
        }
        if let Some(address) = input.address {
            model.address = Set(non_blank(address));
        }
        if let Some(phone_number) = input.phone_number {
            model.phone_number = Set(non_blank(phone_number));
        }

        self.user_repo.update(model).await
    }

    /// Whether the caller's profile exists and has every field filled in.
    /// A missing row reads as incomplete, not as an error.
    pub async fn profile_status(&self, user_id: &str) -> AppResult<bool> {
        Ok(self
            .user_repo
            .find_by_id(user_id)
            .await?
            .is_some_and(|u| u.is_profile_complete()))
    }

    /// Get a user by id.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Whether a user holds the admin role. Checks the mirrored row so a
    /// role revoked between token issuances still takes effect.
    pub async fn is_admin(&self, claims: &Claims) -> AppResult<bool> {
        if claims.role.as_deref() == Some("admin") {
            return Ok(true);
        }
        Ok(self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .is_some_and(|u| u.is_admin()))
    }
}

fn role_from_claims(claims: &Claims) -> UserRole {
    claims
        .role
        .as_deref()
        .and_then(UserRole::parse)
        .unwrap_or_default()
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
