//! User entity.
//!
//! Rows mirror the identity provider: the primary key is the provider's
//! subject, and rows are created lazily on first authenticated profile
//! access or by the provider's lifecycle webhook.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum UserRole {
    #[sea_orm(string_value = "user")]
    #[default]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Parse a role from its wire representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Wire representation of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// User model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// Identity-provider subject.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Primary email address.
    pub email: String,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,

    /// Postal address.
    #[sea_orm(nullable)]
    pub address: Option<String>,

    /// Phone number.
    #[sea_orm(nullable)]
    pub phone_number: Option<String>,

    /// Role within CIRS.
    pub role: UserRole,

    /// When the row was first mirrored.
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether this user is an operator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Whether the profile carries all the fields staff need to follow up:
    /// name, address and phone number.
    #[must_use]
    pub fn is_profile_complete(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
            && self.address.as_deref().is_some_and(|a| !a.trim().is_empty())
            && self
                .phone_number
                .as_deref()
                .is_some_and(|p| !p.trim().is_empty())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
