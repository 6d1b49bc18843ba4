//! Defines the traits for the application's data stores and their SQLite
//! implementations.

mod account;
mod category;
mod organization;
pub mod sqlite;
mod transaction;

pub use account::AccountStore;
pub use category::CategoryStore;
pub use organization::OrganizationStore;
pub use transaction::TransactionStore;
