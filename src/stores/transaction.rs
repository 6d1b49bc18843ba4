//! Defines the transaction store trait.

use crate::{
    database_id::{AccountId, TransactionId},
    models::{NewTransaction, Transaction},
    Error,
};

/// Handles the creation and retrieval of transactions.
///
/// The store persists rows as given: signing amounts and keeping account
/// balances in step with paid transactions is the job of the
/// [ledger](crate::ledger) operations.
pub trait TransactionStore {
    /// Insert a new transaction into the store.
    fn insert(&mut self, transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve all transactions recorded against an account.
    fn get_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, Error>;

    /// Overwrite the stored row for `transaction.id` with `transaction`.
    fn update(&mut self, transaction: &Transaction) -> Result<(), Error>;

    /// Delete a transaction from the store.
    fn delete(&mut self, id: TransactionId) -> Result<(), Error>;
}
