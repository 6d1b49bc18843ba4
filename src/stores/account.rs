//! Defines the account store trait.

use crate::{
    database_id::{AccountId, OrganizationId},
    models::{Account, NewAccount},
    Error,
};

/// Handles the creation and retrieval of accounts and the maintenance of
/// their cached balances.
pub trait AccountStore {
    /// Create a new account in the store with a balance of zero.
    fn create(&mut self, account: NewAccount) -> Result<Account, Error>;

    /// Retrieve an account from the store.
    fn get(&self, id: AccountId) -> Result<Account, Error>;

    /// Retrieve all accounts belonging to an organization.
    fn get_by_organization(&self, organization_id: OrganizationId)
        -> Result<Vec<Account>, Error>;

    /// Add `delta` (signed, minor currency units) to the account's cached
    /// balance.
    ///
    /// Implementations must apply the increment atomically with respect to
    /// concurrent calls on the same account: two concurrent adjustments must
    /// both take effect, never a read-modify-write that loses one.
    fn adjust_balance(&mut self, id: AccountId, delta: i64) -> Result<(), Error>;

    /// Delete an account from the store.
    fn delete(&mut self, id: AccountId) -> Result<(), Error>;
}
