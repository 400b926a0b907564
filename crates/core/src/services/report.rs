//! Report lifecycle service.

use cirs_common::{AppError, AppResult, IdGenerator};
use cirs_db::{
    entities::report,
    repositories::ReportRepository,
};
use sea_orm::Set;

pub use cirs_db::entities::report::ReportStatus;

/// Input for submitting a report.
#[derive(Debug, Clone)]
pub struct CreateReportInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub image_url: Option<String>,
}

/// Input for a partial report update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateReportInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<ReportStatus>,
}

/// Report service for the submission lifecycle.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(report_repo: ReportRepository) -> Self {
        Self {
            report_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new report for `owner_id`.
    ///
    /// The id, timestamp and `pending` status are server-assigned; blank
    /// required fields are rejected before anything is written.
    pub async fn create(
        &self,
        owner_id: &str,
        input: CreateReportInput,
    ) -> AppResult<report::Model> {
        let title = required_field("title", &input.title)?;
        let description = required_field("description", &input.description)?;
        let category = required_field("category", &input.category)?;
        let location = required_field("location", &input.location)?;

        let id = self.id_gen.generate();
        let model = report::ActiveModel {
            id: Set(id),
            user_id: Set(owner_id.to_string()),
            title: Set(title),
            description: Set(description),
            category: Set(category),
            location: Set(location),
            image_url: Set(input.image_url.filter(|u| !u.trim().is_empty())),
            status: Set(ReportStatus::Pending),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let report = self.report_repo.create(model).await?;
        tracing::info!(report_id = %report.id, owner = owner_id, "Report submitted");
        Ok(report)
    }

    /// Get all reports owned by a user, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<report::Model>> {
        self.report_repo.find_by_user(user_id).await
    }

    /// Get every report, newest first (admin surface).
    pub async fn list_all(&self) -> AppResult<Vec<report::Model>> {
        self.report_repo.find_all().await
    }

    /// Get a single report visible to the caller.
    ///
    /// A report owned by someone else reads as not-found to a non-admin, so
    /// existence is not leaked.
    pub async fn get(
        &self,
        id: &str,
        caller_id: &str,
        caller_is_admin: bool,
    ) -> AppResult<report::Model> {
        let report = self.report_repo.get_by_id(id).await?;
        if report.user_id != caller_id && !caller_is_admin {
            return Err(AppError::ReportNotFound(id.to_string()));
        }
        Ok(report)
    }

    /// Partially update a report visible to the caller.
    ///
    /// Status changes go through the forward-only lifecycle; everything else
    /// is a plain field replacement.
    pub async fn update(
        &self,
        id: &str,
        caller_id: &str,
        caller_is_admin: bool,
        input: UpdateReportInput,
    ) -> AppResult<report::Model> {
        let existing = self.get(id, caller_id, caller_is_admin).await?;
        let current_status = existing.status;

        let mut model: report::ActiveModel = existing.into();

        if let Some(title) = input.title {
            model.title = Set(required_field("title", &title)?);
        }
        if let Some(description) = input.description {
            model.description = Set(required_field("description", &description)?);
        }
        if let Some(category) = input.category {
            model.category = Set(required_field("category", &category)?);
        }
        if let Some(location) = input.location {
            model.location = Set(required_field("location", &location)?);
        }
        if let Some(image_url) = input.image_url {
            model.image_url = Set(Some(image_url).filter(|u| !u.trim().is_empty()));
        }
        if let Some(next) = input.status
            && next != current_status
        {
            if !current_status.can_transition(next) {
                return Err(AppError::Validation(format!(
                    "Cannot move report from {} to {}",
                    current_status.as_str(),
                    next.as_str()
                )));
            }
            model.status = Set(next);
        }

        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let report = self.report_repo.update(model).await?;
        tracing::info!(report_id = %report.id, "Report updated");
        Ok(report)
    }

    /// Delete a report. Allowed for the owner and for admins.
    pub async fn delete(&self, id: &str, caller_id: &str, caller_is_admin: bool) -> AppResult<()> {
        // Visibility first: unrelated callers get not-found, never a delete.
        self.get(id, caller_id, caller_is_admin).await?;

        let removed = self.report_repo.delete_by_id(id).await?;
        if removed == 0 {
            return Err(AppError::ReportNotFound(id.to_string()));
        }

        tracing::info!(report_id = id, caller = caller_id, "Report deleted");
        Ok(())
    }
}

fn required_field(name: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{name} is required")));
    }
    Ok(trimmed.to_string())
}
