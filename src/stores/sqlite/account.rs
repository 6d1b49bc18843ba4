//! Implements a SQLite backed account store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    database_id::{AccountId, OrganizationId},
    db::{CreateTable, MapRow},
    models::{Account, NewAccount},
    stores::AccountStore,
    Error,
};

/// Stores accounts and their cached balances in a SQLite database.
///
/// Note that accounts reference organizations, so the
/// [organization store](crate::stores::sqlite::SQLiteOrganizationStore)
/// tables must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteAccountStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteAccountStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteAccountStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY,
                organization_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                balance INTEGER NOT NULL DEFAULT 0,
                UNIQUE(organization_id, name),
                FOREIGN KEY(organization_id) REFERENCES organization(id)
                    ON UPDATE CASCADE ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteAccountStore {
    type ReturnType = Account;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Account, rusqlite::Error> {
        let id = row.get(offset)?;
        let organization_id = row.get(offset + 1)?;
        let name = row.get(offset + 2)?;
        let kind = row.get(offset + 3)?;
        let balance = row.get(offset + 4)?;

        Ok(Account {
            id,
            organization_id,
            name,
            kind,
            balance,
        })
    }
}

impl AccountStore for SQLiteAccountStore {
    /// Create a new account with a balance of zero.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidForeignKey] if the organization does not exist,
    /// - [Error::DuplicateAccountName] if the organization already has an
    ///   account with this name,
    /// - or [Error::SqlError] if there is some other SQL error.
    ///
    /// # Panics
    /// Panics if the database lock has been poisoned.
    fn create(&mut self, account: NewAccount) -> Result<Account, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO account (organization_id, name, kind, balance)
                 VALUES (?1, ?2, ?3, 0)
                 RETURNING id, organization_id, name, kind, balance",
            )?
            .query_row(
                (account.organization_id, &account.name, account.kind),
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
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                    },
                    _,
                ) => Error::DuplicateAccountName(account.name.clone()),
                error => error.into(),
            })
    }

    /// Retrieve an account by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: AccountId) -> Result<Account, Error> {
        let account = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, organization_id, name, kind, balance FROM account WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(account)
    }

    /// Retrieve all accounts belonging to an organization.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn get_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Account>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, organization_id, name, kind, balance FROM account
                 WHERE organization_id = :organization_id
                 ORDER BY name",
            )?
            .query_map(&[(":organization_id", &organization_id)], Self::map_row)?
            .map(|maybe_account| maybe_account.map_err(Error::SqlError))
            .collect()
    }

    /// Add `delta` to the account's cached balance.
    ///
    /// The increment happens inside a single SQL UPDATE, so concurrent
    /// adjustments to the same account serialize in the database and none of
    /// them is lost.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingAccount] if `id` does not refer to a valid
    ///   account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn adjust_balance(&mut self, id: AccountId, delta: i64) -> Result<(), Error> {
        let rows_affected = self.connection.lock().unwrap().execute(
            "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
            (delta, id),
        )?;

        match rows_affected {
            0 => Err(Error::UpdateMissingAccount),
            _ => Ok(()),
        }
    }

    /// Delete an account by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingAccount] if `id` does not refer to a valid
    ///   account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: AccountId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM account WHERE id = :id", &[(":id", &id)])?;

        match rows_affected {
            0 => Err(Error::DeleteMissingAccount),
            _ => Ok(()),
        }
    }
}
