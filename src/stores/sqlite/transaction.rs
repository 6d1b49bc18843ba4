//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    database_id::{AccountId, TransactionId},
    db::{CreateTable, MapRow},
    models::{NewTransaction, Transaction},
    stores::TransactionStore,
    Error,
};

/// Stores transactions in a SQLite database.
///
/// Note that transactions reference accounts, organizations, and categories,
/// so those tables must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                account_id INTEGER NOT NULL,
                organization_id INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                category_id INTEGER,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES account(id)
                    ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(organization_id) REFERENCES organization(id)
                    ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id)
                    ON UPDATE CASCADE ON DELETE SET NULL
                )",
            (),
        )?;

        // Index used when summing or listing an account's paid transactions.
        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_account_status
             ON \"transaction\"(account_id, status)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Transaction, rusqlite::Error> {
        let id = row.get(offset)?;
        let account_id = row.get(offset + 1)?;
        let organization_id = row.get(offset + 2)?;
        let amount = row.get(offset + 3)?;
        let date = row.get(offset + 4)?;
        let description = row.get(offset + 5)?;
        let category_id = row.get(offset + 6)?;
        let kind = row.get(offset + 7)?;
        let status = row.get(offset + 8)?;

        Ok(Transaction {
            id,
            account_id,
            organization_id,
            amount,
            date,
            description,
            category_id,
            kind,
            status,
        })
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, account_id, organization_id, amount, date, description, category_id, kind, status";

impl TransactionStore for SQLiteTransactionStore {
    /// Insert a new transaction into the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidForeignKey] if the account, organization, or category
    ///   does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    ///
    /// # Panics
    /// Panics if the database lock has been poisoned.
    fn insert(&mut self, transaction: NewTransaction) -> Result<Transaction, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO \"transaction\"
                 (account_id, organization_id, amount, date, description, category_id, kind, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    transaction.account_id,
                    transaction.organization_id,
                    transaction.amount,
                    transaction.date,
                    &transaction.description,
                    transaction.category_id,
                    transaction.kind,
                    transaction.status,
                ),
                Self::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                    },
                    _,
                ) => Error::InvalidForeignKey,
                error => error.into(),
            })
    }

    /// Retrieve a transaction by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    /// Retrieve all transactions recorded against an account, oldest first.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn get_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                 WHERE account_id = :account_id
                 ORDER BY date, id"
            ))?
            .query_map(&[(":account_id", &account_id)], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Overwrite the stored row for `transaction.id` with `transaction`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingTransaction] if `transaction.id` does not refer
    ///   to a valid transaction,
    /// - [Error::InvalidForeignKey] if the account, organization, or category
    ///   does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, transaction: &Transaction) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .unwrap()
            .execute(
                "UPDATE \"transaction\"
                 SET account_id = ?1, organization_id = ?2, amount = ?3, date = ?4,
                     description = ?5, category_id = ?6, kind = ?7, status = ?8
                 WHERE id = ?9",
                (
                    transaction.account_id,
                    transaction.organization_id,
                    transaction.amount,
                    transaction.date,
                    &transaction.description,
                    transaction.category_id,
                    transaction.kind,
                    transaction.status,
                    transaction.id,
                ),
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                    },
                    _,
                ) => Error::InvalidForeignKey,
                error => error.into(),
            })?;

        match rows_affected {
            0 => Err(Error::UpdateMissingTransaction),
            _ => Ok(()),
        }
    }

    /// Delete a transaction by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid
    ///   transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])?;

        match rows_affected {
            0 => Err(Error::DeleteMissingTransaction),
            _ => Ok(()),
        }
    }
}
