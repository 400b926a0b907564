//! User profile endpoints.

use axum::{Json, Router, extract::State, routing::get};
use cirs_common::AppResult;
use cirs_core::UpdateProfileInput;
use cirs_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState};

/// A user profile as returned on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub role: &'static str,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            address: model.address,
            phone_number: model.phone_number,
            role: model.role.as_str(),
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Request to partially update the caller's profile.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

/// Profile completeness response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStatusResponse {
    pub is_profile_complete: bool,
}

/// Get the caller's profile, creating the mirror row on first access.
async fn get_profile(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_or_create(&claims).await?;
    Ok(Json(user.into()))
}

/// Partially update the caller's profile.
async fn update_profile(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let input = UpdateProfileInput {
        first_name: req.first_name,
        last_name: req.last_name,
        address: req.address,
        phone_number: req.phone_number,
    };
    let user = state.user_service.update_profile(&claims, input).await?;
    Ok(Json(user.into()))
}

/// Whether the caller's profile has every field filled in.
async fn profile_status(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileStatusResponse>> {
    let is_profile_complete = state.user_service.profile_status(&claims.sub).await?;
    Ok(Json(ProfileStatusResponse {
        is_profile_complete,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).patch(update_profile))
        .route("/profile-status", get(profile_status))
}
