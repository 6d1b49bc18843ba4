//! Defines the account model.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::database_id::{AccountId, OrganizationId};

/// The kind of account a balance is held against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// A bank account, e.g. checking or savings.
    Bank,
    /// Physical cash.
    Cash,
    /// A credit card.
    Credit,
}

impl AccountKind {
    /// The string stored in the database for this account kind.
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::Bank => "bank",
            AccountKind::Cash => "cash",
            AccountKind::Credit => "credit",
        }
    }

    /// Parse an account kind from its stored string form.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "bank" => Some(AccountKind::Bank),
            "cash" => Some(AccountKind::Cash),
            "credit" => Some(AccountKind::Credit),
            _ => None,
        }
    }
}

impl ToSql for AccountKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AccountKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Self::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown account kind {text:?}").into()))
    }
}

/// An account that money is spent from or earned into.
///
/// The balance is a cached aggregate in minor currency units (cents): it is
/// kept equal to the signed sum of the account's paid transactions by the
/// ledger operations, not recomputed from the transactions on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The organization the account belongs to.
    pub organization_id: OrganizationId,
    /// The name of the account.
    pub name: String,
    /// The kind of account.
    pub kind: AccountKind,
    /// The cached balance in minor currency units.
    pub balance: i64,
}

/// The data needed to create a new [Account].
///
/// New accounts start with a balance of zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The organization the account will belong to.
    pub organization_id: OrganizationId,
    /// The name of the account.
    pub name: String,
    /// The kind of account.
    pub kind: AccountKind,
}

#[cfg(test)]
mod account_kind_tests {
    use super::AccountKind;

    #[test]
    fn round_trips_through_stored_string() {
        for kind in [AccountKind::Bank, AccountKind::Cash, AccountKind::Credit] {
            assert_eq!(Some(kind), AccountKind::parse(kind.as_str()));
        }
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert_eq!(None, AccountKind::parse("cheque"));
    }
}
