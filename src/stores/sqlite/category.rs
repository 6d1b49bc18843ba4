//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    database_id::{CategoryId, OrganizationId},
    db::{CreateTable, MapRow},
    models::{Category, NewCategory},
    stores::CategoryStore,
    Error,
};

/// Stores categories in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                organization_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                FOREIGN KEY(organization_id) REFERENCES organization(id)
                    ON UPDATE CASCADE ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Category, rusqlite::Error> {
        let id = row.get(offset)?;
        let organization_id = row.get(offset + 1)?;
        let name = row.get(offset + 2)?;

        Ok(Category {
            id,
            organization_id,
            name,
        })
    }
}

impl CategoryStore for SQLiteCategoryStore {
    /// Create a new category.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidForeignKey] if the organization does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, category: NewCategory) -> Result<Category, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO category (organization_id, name) VALUES (?1, ?2)
                 RETURNING id, organization_id, name",
            )?
            .query_row((category.organization_id, &category.name), Self::map_row)
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

    /// Retrieve a category by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: CategoryId) -> Result<Category, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, organization_id, name FROM category WHERE id = :id")?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(category)
    }

    /// Retrieve all categories belonging to an organization.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn get_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Category>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, organization_id, name FROM category
                 WHERE organization_id = :organization_id
                 ORDER BY name",
            )?
            .query_map(&[(":organization_id", &organization_id)], Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(Error::SqlError))
            .collect()
    }

    /// Delete a category by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingCategory] if `id` does not refer to a valid
    ///   category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: CategoryId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM category WHERE id = :id", &[(":id", &id)])?;

        match rows_affected {
            0 => Err(Error::DeleteMissingCategory),
            _ => Ok(()),
        }
    }
}
