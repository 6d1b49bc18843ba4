//! Defines the organization (tenant) model and membership roles.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::database_id::{OrganizationId, UserId};

/// The tenant boundary: every account, category, and transaction belongs to
/// exactly one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// The ID of the organization.
    pub id: OrganizationId,
    /// The display name of the organization.
    pub name: String,
}

/// The role a user holds within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationRole {
    /// Can create and manage accounts, categories, and transactions.
    Member,
    /// A member that can additionally delete accounts and categories.
    Owner,
}

impl OrganizationRole {
    /// The string stored in the database for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            OrganizationRole::Member => "member",
            OrganizationRole::Owner => "owner",
        }
    }

    /// Parse a role from its stored string form.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "member" => Some(OrganizationRole::Member),
            "owner" => Some(OrganizationRole::Owner),
            _ => None,
        }
    }
}

impl ToSql for OrganizationRole {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for OrganizationRole {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Self::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown role {text:?}").into()))
    }
}

/// A user's membership of an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    /// The organization the user belongs to.
    pub organization_id: OrganizationId,
    /// The user that belongs to the organization.
    pub user_id: UserId,
    /// The role the user holds within the organization.
    pub role: OrganizationRole,
}
