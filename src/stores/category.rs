//! Defines the category store trait.

use crate::{
    database_id::{CategoryId, OrganizationId},
    models::{Category, NewCategory},
    Error,
};

/// Handles the creation and retrieval of categories.
pub trait CategoryStore {
    /// Create a new category in the store.
    fn create(&mut self, category: NewCategory) -> Result<Category, Error>;

    /// Retrieve a category from the store.
    fn get(&self, id: CategoryId) -> Result<Category, Error>;

    /// Retrieve all categories belonging to an organization.
    fn get_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Category>, Error>;

    /// Delete a category from the store.
    fn delete(&mut self, id: CategoryId) -> Result<(), Error>;
}
