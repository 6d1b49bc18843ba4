//! Defines the transaction model: an expense or income recorded against an
//! account, either pending or paid.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::database_id::{AccountId, CategoryId, OrganizationId, TransactionId};

/// Whether a transaction brings money into or out of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned into the account.
    Income,
    /// Money spent from the account.
    Expense,
}

impl TransactionKind {
    /// The string stored in the database for this transaction kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parse a transaction kind from its stored string form.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }

    /// Re-sign `magnitude` for this kind: positive for income, negative for
    /// expense. The sign of `magnitude` itself is ignored.
    pub fn signed(self, magnitude: i64) -> i64 {
        match self {
            TransactionKind::Income => magnitude.abs(),
            TransactionKind::Expense => -magnitude.abs(),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Self::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown transaction kind {text:?}").into()))
    }
}

/// The settlement status of a transaction.
///
/// Only paid transactions contribute to an account's cached balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The transaction has not settled yet.
    Pending,
    /// The transaction has settled and counts towards the account balance.
    Paid,
}

impl TransactionStatus {
    /// The string stored in the database for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
        }
    }

    /// Parse a status from its stored string form.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "pending" => Some(TransactionStatus::Pending),
            "paid" => Some(TransactionStatus::Paid),
            _ => None,
        }
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Self::parse(text).ok_or_else(|| {
            FromSqlError::Other(format!("unknown transaction status {text:?}").into())
        })
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the transaction was recorded against.
    pub account_id: AccountId,
    /// The organization the transaction belongs to.
    pub organization_id: OrganizationId,
    /// The signed amount in minor currency units: positive for income,
    /// negative for expense.
    pub amount: i64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// Whether the transaction has settled.
    pub status: TransactionStatus,
}

/// A fully validated transaction row ready to be inserted.
///
/// `amount` is the signed amount. Producing one of these from user input,
/// including re-signing the amount, is the job of
/// [record_transaction](crate::ledger::record_transaction).
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The account the transaction is recorded against.
    pub account_id: AccountId,
    /// The organization the transaction belongs to.
    pub organization_id: OrganizationId,
    /// The signed amount in minor currency units.
    pub amount: i64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// Whether the transaction has settled.
    pub status: TransactionStatus,
}

/// User input for recording a transaction.
///
/// `amount` is a positive magnitude in minor currency units; the stored sign
/// is derived from `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// The account to record the transaction against.
    pub account_id: AccountId,
    /// The amount as a positive magnitude in minor currency units.
    pub amount: i64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// Whether the transaction has settled.
    pub status: TransactionStatus,
}

/// The field updates that may be applied to a transaction.
///
/// `None` leaves the field unchanged. `amount` is a positive magnitude, as in
/// [TransactionDraft]; the stored sign is re-derived from the effective kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionAmendment {
    /// Move the transaction to a different account.
    pub account_id: Option<AccountId>,
    /// Change the amount (positive magnitude in minor currency units).
    pub amount: Option<i64>,
    /// Change the transaction date.
    pub date: Option<Date>,
    /// Change the description.
    pub description: Option<String>,
    /// Change or clear the category (`Some(None)` clears it).
    pub category_id: Option<Option<CategoryId>>,
    /// Change the transaction kind.
    pub kind: Option<TransactionKind>,
    /// Change the settlement status.
    pub status: Option<TransactionStatus>,
}
