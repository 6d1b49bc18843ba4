//! SQLite implementations of the store traits.

mod account;
mod category;
mod organization;
mod transaction;

pub use account::SQLiteAccountStore;
pub use category::SQLiteCategoryStore;
pub use organization::SQLiteOrganizationStore;
pub use transaction::SQLiteTransactionStore;
