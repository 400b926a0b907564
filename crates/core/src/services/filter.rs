//! In-memory report filtering for the admin listing.

use cirs_db::entities::report::{self, ReportStatus};

/// Filter criteria for the admin report listing. Criteria combine with AND;
/// an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Exact status match.
    pub status: Option<ReportStatus>,
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring over title, description and location.
    pub query: Option<String>,
}

impl ReportFilter {
    /// Whether any criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.category.is_none() && self.query.is_none()
    }

    /// Whether a report satisfies all set criteria.
    #[must_use]
    pub fn matches(&self, report: &report::Model) -> bool {
        if let Some(status) = self.status
            && report.status != status
        {
            return false;
        }
        if let Some(category) = &self.category
            && report.category != *category
        {
            return false;
        }
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let hit = report.title.to_lowercase().contains(&needle)
                || report.description.to_lowercase().contains(&needle)
                || report.location.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }

    /// Keep only the reports that match, preserving order.
    #[must_use]
    pub fn apply(&self, reports: Vec<report::Model>) -> Vec<report::Model> {
        if self.is_empty() {
            return reports;
        }
        reports.into_iter().filter(|r| self.matches(r)).collect()
    }
}
