//! Pocketbook is a multi-tenant personal-finance core: organizations own
//! accounts, categories, and transactions, and each account carries a cached
//! balance in minor currency units that the [ledger] operations keep equal to
//! the signed sum of the account's paid transactions.
//!
//! Identity is external: callers pass the authenticated user's ID and the
//! [auth] module checks it against organization memberships. Persistence goes
//! through the store traits in [stores], with SQLite implementations in
//! [stores::sqlite].

#![warn(missing_docs)]

pub mod auth;
pub mod database_id;
pub mod db;
mod error;
pub mod ledger;
pub mod models;
pub mod services;
pub mod stores;

pub use db::initialize as initialize_db;
pub use error::Error;
