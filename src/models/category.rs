//! Defines the category model.

use serde::{Deserialize, Serialize};

use crate::database_id::{CategoryId, OrganizationId};

/// A user-defined label that describes what a transaction was for, e.g.
/// "Groceries", "Transport", "Rent".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The organization the category belongs to.
    pub organization_id: OrganizationId,
    /// The name of the category.
    pub name: String,
}

/// The data needed to create a new [Category].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The organization the category will belong to.
    pub organization_id: OrganizationId,
    /// The name of the category.
    pub name: String,
}
