//! Report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

impl ReportStatus {
    /// Parse a status from its wire representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in-progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    /// Wire representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// The flow is forward-only: `pending` may move to `in-progress` or
    /// straight to `resolved`, `in-progress` only to `resolved`.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress | Self::Resolved)
                | (Self::InProgress, Self::Resolved)
        )
    }
}

/// Report model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The user who submitted the report.
    pub user_id: String,
    /// Short summary of the issue.
    pub title: String,
    /// Full description of the issue.
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Issue category.
    pub category: String,
    /// Where the issue was observed.
    pub location: String,
    /// Optional photo URL.
    #[sea_orm(nullable)]
    pub image_url: Option<String>,
    /// Current lifecycle status.
    pub status: ReportStatus,
    /// When the report was submitted.
    pub created_at: DateTimeWithTimeZone,
    /// When the report was last modified.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
