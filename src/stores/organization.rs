//! Defines the organization store trait.

use crate::{
    database_id::{OrganizationId, UserId},
    models::{Organization, OrganizationRole},
    Error,
};

/// Handles the creation of organizations and the membership facts that the
/// authorization check reads.
pub trait OrganizationStore {
    /// Create a new organization in the store with `owner` as its first
    /// member, holding the owner role.
    fn create(&mut self, name: &str, owner: UserId) -> Result<Organization, Error>;

    /// Retrieve an organization from the store.
    fn get(&self, id: OrganizationId) -> Result<Organization, Error>;

    /// Add `user_id` to the organization with `role`, or change their role if
    /// they are already a member.
    fn add_member(
        &mut self,
        organization_id: OrganizationId,
        user_id: UserId,
        role: OrganizationRole,
    ) -> Result<(), Error>;

    /// The role `user_id` holds in the organization, or `None` if they are
    /// not a member.
    fn role_of(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<OrganizationRole>, Error>;
}
