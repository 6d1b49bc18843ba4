//! Defines the domain models.

mod account;
mod category;
mod organization;
mod transaction;

pub use account::{Account, AccountKind, NewAccount};
pub use category::{Category, NewCategory};
pub use organization::{Membership, Organization, OrganizationRole};
pub use transaction::{
    NewTransaction, Transaction, TransactionAmendment, TransactionDraft, TransactionKind,
    TransactionStatus,
};
