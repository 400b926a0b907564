//! Report endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use cirs_common::{AppError, AppResult};
use cirs_core::{CreateReportInput, ReportStatus, UpdateReportInput};
use cirs_db::entities::report;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState};

/// A report as returned on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub image_url: Option<String>,
    pub status: &'static str,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<report::Model> for ReportResponse {
    fn from(model: report::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            category: model.category,
            location: model.location,
            image_url: model.image_url,
            status: model.status.as_str(),
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Request to submit a report.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    pub image_url: Option<String>,
}

/// Request to partially update a report. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
}

impl UpdateReportRequest {
    fn into_input(self) -> AppResult<UpdateReportInput> {
        let status = match self.status {
            Some(raw) => Some(
                ReportStatus::parse(&raw)
                    .ok_or_else(|| AppError::Validation(format!("Unknown status: {raw}")))?,
            ),
            None => None,
        };
        Ok(UpdateReportInput {
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            image_url: self.image_url,
            status,
        })
    }
}

/// Submit a new report.
async fn create_report(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<(StatusCode, Json<ReportResponse>)> {
    req.validate()?;

    let input = CreateReportInput {
        title: req.title,
        description: req.description,
        category: req.category,
        location: req.location,
        image_url: req.image_url,
    };
    let report = state.report_service.create(&claims.sub, input).await?;
    Ok((StatusCode::CREATED, Json(report.into())))
}

/// List the caller's reports, newest first.
async fn list_reports(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ReportResponse>>> {
    let reports = state.report_service.list_for_user(&claims.sub).await?;
    Ok(Json(reports.into_iter().map(Into::into).collect()))
}

/// Get a single report.
async fn get_report(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ReportResponse>> {
    let is_admin = state.user_service.is_admin(&claims).await?;
    let report = state.report_service.get(&id, &claims.sub, is_admin).await?;
    Ok(Json(report.into()))
}

/// Partially update a report.
async fn update_report(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateReportRequest>,
) -> AppResult<Json<ReportResponse>> {
    let is_admin = state.user_service.is_admin(&claims).await?;
    let input = req.into_input()?;
    let report = state
        .report_service
        .update(&id, &claims.sub, is_admin, input)
        .await?;
    Ok(Json(report.into()))
}

/// Delete report response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReportResponse {
    pub message: &'static str,
}

/// Delete a report.
async fn delete_report(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteReportResponse>> {
    let is_admin = state.user_service.is_admin(&claims).await?;
    state
        .report_service
        .delete(&id, &claims.sub, is_admin)
        .await?;
    Ok(Json(DeleteReportResponse {
        message: "Report deleted successfully",
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports).post(create_report))
        .route(
            "/{id}",
            get(get_report).patch(update_report).delete(delete_report),
        )
}
