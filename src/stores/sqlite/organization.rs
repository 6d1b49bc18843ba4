//! Implements a SQLite backed organization store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    database_id::{OrganizationId, UserId},
    db::{CreateTable, MapRow},
    models::{Organization, OrganizationRole},
    stores::OrganizationStore,
    Error,
};

/// Stores organizations and their memberships in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteOrganizationStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteOrganizationStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteOrganizationStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS organization (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
                )",
            (),
        )?;

        connection.execute(
            "CREATE TABLE IF NOT EXISTS membership (
                organization_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                role TEXT NOT NULL,
                PRIMARY KEY (organization_id, user_id),
                FOREIGN KEY(organization_id) REFERENCES organization(id)
                    ON UPDATE CASCADE ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteOrganizationStore {
    type ReturnType = Organization;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Organization, rusqlite::Error> {
        let id = row.get(offset)?;
        let name = row.get(offset + 1)?;

        Ok(Organization { id, name })
    }
}

impl OrganizationStore for SQLiteOrganizationStore {
    /// Create a new organization with `owner` as its first member.
    ///
    /// The organization row and the owner's membership row are written within
    /// one SQL transaction.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error.
    ///
    /// # Panics
    /// Panics if the database lock has been poisoned.
    fn create(&mut self, name: &str, owner: UserId) -> Result<Organization, Error> {
        let connection = self.connection.lock().unwrap();
        let sql_transaction = connection.unchecked_transaction()?;

        let organization = sql_transaction
            .prepare("INSERT INTO organization (name) VALUES (?1) RETURNING id, name")?
            .query_row((name,), Self::map_row)?;

        sql_transaction.execute(
            "INSERT INTO membership (organization_id, user_id, role) VALUES (?1, ?2, ?3)",
            (organization.id, owner, OrganizationRole::Owner),
        )?;

        sql_transaction.commit()?;

        Ok(organization)
    }

    /// Retrieve an organization by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid organization,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: OrganizationId) -> Result<Organization, Error> {
        let organization = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name FROM organization WHERE id = :id")?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(organization)
    }

    /// Add `user_id` to the organization, or change their role if they are
    /// already a member.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidForeignKey] if `organization_id` does not refer to a
    ///   valid organization,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn add_member(
        &mut self,
        organization_id: OrganizationId,
        user_id: UserId,
        role: OrganizationRole,
    ) -> Result<(), Error> {
        self.connection
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO membership (organization_id, user_id, role) VALUES (?1, ?2, ?3)
                 ON CONFLICT(organization_id, user_id) DO UPDATE SET role = excluded.role",
                (organization_id, user_id, role),
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

        Ok(())
    }

    /// The role `user_id` holds in the organization, or `None` if they are
    /// not a member.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn role_of(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<OrganizationRole>, Error> {
        let role = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT role FROM membership
                 WHERE organization_id = :organization_id AND user_id = :user_id",
            )?
            .query_row(
                &[(":organization_id", &organization_id), (":user_id", &user_id)],
                |row| row.get(0),
            )
            .optional()?;

        Ok(role)
    }
}
