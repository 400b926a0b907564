//! Admin endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use cirs_common::{AppError, AppResult};
use cirs_core::{ReportFilter, ReportStatus};
use serde::Deserialize;

use crate::{endpoints::ReportResponse, extractors::AuthUser, middleware::AppState};

/// Query parameters for the admin report listing.
#[derive(Debug, Deserialize, Default)]
pub struct AdminReportsQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    /// Free-text search over title, description and location.
    pub q: Option<String>,
}

impl AdminReportsQuery {
    fn into_filter(self) -> AppResult<ReportFilter> {
        let status = match self.status {
            Some(raw) => Some(
                ReportStatus::parse(&raw)
                    .ok_or_else(|| AppError::Validation(format!("Unknown status: {raw}")))?,
            ),
            None => None,
        };
        Ok(ReportFilter {
            status,
            category: self.category.filter(|c| !c.is_empty()),
            query: self.q.filter(|q| !q.is_empty()),
        })
    }
}

/// List every report, newest first, optionally narrowed by the query.
async fn list_all_reports(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AdminReportsQuery>,
) -> AppResult<Json<Vec<ReportResponse>>> {
    if !state.user_service.is_admin(&claims).await? {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    let filter = query.into_filter()?;
    let reports = filter.apply(state.report_service.list_all().await?);
    Ok(Json(reports.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/reports", get(list_all_reports))
}
