//! The capability check used by every operation that touches a tenant's data:
//! does the caller hold the required role on the owning organization?

use crate::{
    database_id::{OrganizationId, UserId},
    models::OrganizationRole,
    stores::OrganizationStore,
    Error,
};

/// The access level an operation requires on an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// Any membership of the organization suffices.
    Member,
    /// The owner role is required, e.g. for deleting accounts or categories.
    Owner,
}

/// Check that `user_id` holds at least `level` on the organization.
///
/// # Errors
/// This function will return a:
/// - [Error::NotAMember] if the caller has no membership of the organization,
/// - [Error::OwnerRequired] if the caller is a member but `level` is
///   [AccessLevel::Owner],
/// - or [Error::SqlError] if the membership lookup fails.
pub fn ensure_access<O>(
    organizations: &O,
    organization_id: OrganizationId,
    user_id: UserId,
    level: AccessLevel,
) -> Result<(), Error>
where
    O: OrganizationStore,
{
    let role = organizations.role_of(organization_id, user_id)?;

    match (role, level) {
        (None, _) => Err(Error::NotAMember(organization_id)),
        (Some(OrganizationRole::Member), AccessLevel::Owner) => {
            Err(Error::OwnerRequired(organization_id))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod ensure_access_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        db::initialize,
        models::{Organization, OrganizationRole},
        stores::{OrganizationStore, sqlite::SQLiteOrganizationStore},
        Error,
    };

    use super::{ensure_access, AccessLevel};

    const OWNER: i64 = 1;
    const MEMBER: i64 = 2;
    const STRANGER: i64 = 3;

    fn get_test_store() -> (SQLiteOrganizationStore, Organization) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let mut store = SQLiteOrganizationStore::new(Arc::new(Mutex::new(connection)));
        let organization = store.create("Dickson household", OWNER).unwrap();
        store
            .add_member(organization.id, MEMBER, OrganizationRole::Member)
            .unwrap();

        (store, organization)
    }

    #[test]
    fn member_passes_member_check() {
        let (store, organization) = get_test_store();

        let result = ensure_access(&store, organization.id, MEMBER, AccessLevel::Member);

        assert_eq!(Ok(()), result);
    }

    #[test]
    fn member_fails_owner_check() {
        let (store, organization) = get_test_store();

        let result = ensure_access(&store, organization.id, MEMBER, AccessLevel::Owner);

        assert_eq!(Err(Error::OwnerRequired(organization.id)), result);
    }

    #[test]
    fn owner_passes_both_checks() {
        let (store, organization) = get_test_store();

        for level in [AccessLevel::Member, AccessLevel::Owner] {
            assert_eq!(Ok(()), ensure_access(&store, organization.id, OWNER, level));
        }
    }

    #[test]
    fn non_member_fails_both_checks() {
        let (store, organization) = get_test_store();

        for level in [AccessLevel::Member, AccessLevel::Owner] {
            assert_eq!(
                Err(Error::NotAMember(organization.id)),
                ensure_access(&store, organization.id, STRANGER, level)
            );
        }
    }
}
