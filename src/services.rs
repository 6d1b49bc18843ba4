//! Authorized management of organizations, accounts, and categories: thin
//! validate-then-forward calls around the stores.
//!
//! Creating an account or category requires membership of the organization;
//! deleting either requires the owner role. Transactions are managed by the
//! [ledger](crate::ledger) operations, which deliberately require only
//! membership for removal.

use crate::{
    auth::{ensure_access, AccessLevel},
    database_id::{AccountId, CategoryId, UserId},
    models::{Account, Category, NewAccount, NewCategory, Organization},
    stores::{AccountStore, CategoryStore, OrganizationStore},
    Error,
};

/// Create a new organization with the caller as its owner.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if `name` is empty or whitespace,
/// - or [Error::SqlError] if the insert fails.
pub fn create_organization<O>(
    name: &str,
    caller: UserId,
    organizations: &mut O,
) -> Result<Organization, Error>
where
    O: OrganizationStore,
{
    if name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    organizations.create(name, caller)
}

/// Create a new account in the organization.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if the account name is empty or whitespace,
/// - [Error::NotAMember] if the caller does not belong to the organization,
/// - [Error::DuplicateAccountName] if the organization already has an account
///   with this name,
/// - or [Error::SqlError] if the insert fails.
pub fn create_account<O, A>(
    account: NewAccount,
    caller: UserId,
    organizations: &O,
    accounts: &mut A,
) -> Result<Account, Error>
where
    O: OrganizationStore,
    A: AccountStore,
{
    if account.name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    ensure_access(
        organizations,
        account.organization_id,
        caller,
        AccessLevel::Member,
    )?;

    accounts.create(account)
}

/// Delete an account. Requires the owner role.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingAccount] if `id` does not refer to a valid account,
/// - [Error::NotAMember] or [Error::OwnerRequired] if the caller lacks the
///   owner role on the account's organization,
/// - or [Error::SqlError] if the delete fails.
pub fn delete_account<O, A>(
    id: AccountId,
    caller: UserId,
    organizations: &O,
    accounts: &mut A,
) -> Result<(), Error>
where
    O: OrganizationStore,
    A: AccountStore,
{
    let account = accounts.get(id).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingAccount,
        error => error,
    })?;

    ensure_access(
        organizations,
        account.organization_id,
        caller,
        AccessLevel::Owner,
    )?;

    accounts.delete(id)
}

/// Create a new category in the organization.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if the category name is empty or whitespace,
/// - [Error::NotAMember] if the caller does not belong to the organization,
/// - or [Error::SqlError] if the insert fails.
pub fn create_category<O, C>(
    category: NewCategory,
    caller: UserId,
    organizations: &O,
    categories: &mut C,
) -> Result<Category, Error>
where
    O: OrganizationStore,
    C: CategoryStore,
{
    if category.name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    ensure_access(
        organizations,
        category.organization_id,
        caller,
        AccessLevel::Member,
    )?;

    categories.create(category)
}

/// Delete a category. Requires the owner role.
///
/// Transactions that reference the category keep existing; the database
/// clears their category reference.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if `id` does not refer to a valid
///   category,
/// - [Error::NotAMember] or [Error::OwnerRequired] if the caller lacks the
///   owner role on the category's organization,
/// - or [Error::SqlError] if the delete fails.
pub fn delete_category<O, C>(
    id: CategoryId,
    caller: UserId,
    organizations: &O,
    categories: &mut C,
) -> Result<(), Error>
where
    O: OrganizationStore,
    C: CategoryStore,
{
    let category = categories.get(id).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingCategory,
        error => error,
    })?;

    ensure_access(
        organizations,
        category.organization_id,
        caller,
        AccessLevel::Owner,
    )?;

    categories.delete(id)
}
