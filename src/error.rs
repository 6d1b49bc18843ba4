//! Defines the app level error type.

use time::Date;

use crate::database_id::OrganizationId;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A zero or negative amount was used to create or amend a transaction.
    ///
    /// Transaction amounts are given as a positive magnitude in minor
    /// currency units; the sign is derived from the transaction kind.
    #[error("{0} is not a valid transaction amount, expected a positive number of cents")]
    InvalidAmount(i64),

    /// A date in the future was used to create or amend a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// An empty string was used as an organization, account, or category name.
    #[error("name cannot be empty")]
    EmptyName,

    /// The caller is not a member of the organization that owns the resource.
    #[error("the caller is not a member of organization {0}")]
    NotAMember(OrganizationId),

    /// The caller is a member of the organization but the action requires the
    /// owner role.
    #[error("this action requires the owner role on organization {0}")]
    OwnerRequired(OrganizationId),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A query was given an ID that does not refer to an existing row.
    #[error("a referenced row does not exist")]
    InvalidForeignKey,

    /// The specified account name already exists within the organization.
    #[error("the account \"{0}\" already exists in the organization")]
    DuplicateAccountName(String),

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
