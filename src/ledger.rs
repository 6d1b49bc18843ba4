//! The ledger operations: record, amend, and remove transactions while
//! keeping each account's cached balance equal to the signed sum of the
//! account's paid transactions.
//!
//! The transaction row write is the reported outcome of each operation. The
//! balance adjustment is a secondary write: if it fails, the failure is
//! logged and the operation still reports success, leaving the cached balance
//! behind the true sum until it is corrected by a later adjustment. Balance
//! adjustments go through [AccountStore::adjust_balance], which applies the
//! delta atomically, so concurrent operations on one account never lose an
//! update.

use time::OffsetDateTime;

use crate::{
    auth::{ensure_access, AccessLevel},
    database_id::{AccountId, TransactionId, UserId},
    models::{NewTransaction, Transaction, TransactionAmendment, TransactionDraft, TransactionStatus},
    stores::{AccountStore, OrganizationStore, TransactionStore},
    Error,
};

/// Record a new transaction against an account.
///
/// The stored amount is re-signed from the draft's kind: positive for income,
/// negative for expense. If the transaction is recorded as paid, its signed
/// amount is folded into the account's cached balance; a failure of that
/// balance write is logged and does not fail the operation.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the draft amount is zero or negative,
/// - [Error::FutureDate] if the draft date is later than today,
/// - [Error::NotFound] if the draft account does not exist,
/// - [Error::NotAMember] if the caller does not belong to the account's
///   organization,
/// - [Error::InvalidForeignKey] if the draft category does not exist,
/// - or [Error::SqlError] if the transaction insert fails.
pub fn record_transaction<O, A, T>(
    draft: TransactionDraft,
    caller: UserId,
    organizations: &O,
    accounts: &mut A,
    transactions: &mut T,
) -> Result<Transaction, Error>
where
    O: OrganizationStore,
    A: AccountStore,
    T: TransactionStore,
{
    if draft.amount <= 0 {
        return Err(Error::InvalidAmount(draft.amount));
    }

    if draft.date > today() {
        return Err(Error::FutureDate(draft.date));
    }

    let account = accounts.get(draft.account_id)?;
    ensure_access(
        organizations,
        account.organization_id,
        caller,
        AccessLevel::Member,
    )?;

    let signed_amount = draft.kind.signed(draft.amount);

    let transaction = transactions.insert(NewTransaction {
        account_id: draft.account_id,
        organization_id: account.organization_id,
        amount: signed_amount,
        date: draft.date,
        description: draft.description,
        category_id: draft.category_id,
        kind: draft.kind,
        status: draft.status,
    })?;

    if transaction.status == TransactionStatus::Paid {
        apply_balance(accounts, transaction.account_id, signed_amount);
    }

    Ok(transaction)
}

/// Apply a set of field updates to a transaction, compensating the cached
/// balances of the affected account(s).
///
/// The compensation applies `new contribution - old contribution` where a
/// transaction's contribution is its signed amount while paid and zero while
/// pending. When the transaction moves between accounts the old account has
/// the old contribution removed and the new account has the new contribution
/// added. As with [record_transaction], a failed balance write is logged and
/// does not fail the operation.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction, or the
///   amendment moves it to an account that does not exist,
/// - [Error::NotAMember] if the caller does not belong to the transaction's
///   organization, or to the destination account's organization,
/// - [Error::InvalidAmount] if the amended amount is zero or negative,
/// - [Error::FutureDate] if the amended date is later than today,
/// - or [Error::SqlError] if the transaction update fails.
pub fn amend_transaction<O, A, T>(
    id: TransactionId,
    amendment: TransactionAmendment,
    caller: UserId,
    organizations: &O,
    accounts: &mut A,
    transactions: &mut T,
) -> Result<Transaction, Error>
where
    O: OrganizationStore,
    A: AccountStore,
    T: TransactionStore,
{
    let old = transactions.get(id)?;
    ensure_access(
        organizations,
        old.organization_id,
        caller,
        AccessLevel::Member,
    )?;

    if let Some(amount) = amendment.amount {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
    }

    if let Some(date) = amendment.date {
        if date > today() {
            return Err(Error::FutureDate(date));
        }
    }

    let kind = amendment.kind.unwrap_or(old.kind);
    let magnitude = amendment.amount.unwrap_or(old.amount.abs());

    let mut new = Transaction {
        id: old.id,
        account_id: amendment.account_id.unwrap_or(old.account_id),
        organization_id: old.organization_id,
        amount: kind.signed(magnitude),
        date: amendment.date.unwrap_or(old.date),
        description: amendment
            .description
            .unwrap_or_else(|| old.description.clone()),
        category_id: amendment.category_id.unwrap_or(old.category_id),
        kind,
        status: amendment.status.unwrap_or(old.status),
    };

    if new.account_id != old.account_id {
        let destination = accounts.get(new.account_id)?;
        ensure_access(
            organizations,
            destination.organization_id,
            caller,
            AccessLevel::Member,
        )?;
        new.organization_id = destination.organization_id;
    }

    transactions.update(&new)?;

    let old_contribution = contribution(&old);
    let new_contribution = contribution(&new);

    if new.account_id == old.account_id {
        apply_balance(
            accounts,
            old.account_id,
            new_contribution - old_contribution,
        );
    } else {
        apply_balance(accounts, old.account_id, -old_contribution);
        apply_balance(accounts, new.account_id, new_contribution);
    }

    Ok(new)
}

/// Remove a transaction.
///
/// If the transaction is paid, its stored signed amount is subtracted from
/// the account's cached balance before the row is deleted, reversing the
/// contribution it made when it was recorded. The reversal is a secondary
/// write: if it fails, the failure is logged and the row is deleted anyway.
///
/// Removing a transaction requires only membership, unlike deleting an
/// account or category which requires the owner role.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid
///   transaction (including a transaction that was already removed),
/// - [Error::NotAMember] if the caller does not belong to the transaction's
///   organization,
/// - or [Error::SqlError] if the delete fails.
pub fn remove_transaction<O, A, T>(
    id: TransactionId,
    caller: UserId,
    organizations: &O,
    accounts: &mut A,
    transactions: &mut T,
) -> Result<(), Error>
where
    O: OrganizationStore,
    A: AccountStore,
    T: TransactionStore,
{
    let transaction = transactions.get(id).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        error => error,
    })?;

    ensure_access(
        organizations,
        transaction.organization_id,
        caller,
        AccessLevel::Member,
    )?;

    if transaction.status == TransactionStatus::Paid {
        apply_balance(accounts, transaction.account_id, -transaction.amount);
    }

    transactions.delete(id)
}

/// A transaction's contribution to its account's cached balance: the signed
/// amount while paid, zero while pending.
fn contribution(transaction: &Transaction) -> i64 {
    match transaction.status {
        TransactionStatus::Paid => transaction.amount,
        TransactionStatus::Pending => 0,
    }
}

/// Best-effort balance adjustment: a failure is logged, never surfaced.
fn apply_balance<A>(accounts: &mut A, account_id: AccountId, delta: i64)
where
    A: AccountStore,
{
    if delta == 0 {
        return;
    }

    if let Err(error) = accounts.adjust_balance(account_id, delta) {
        tracing::warn!("could not adjust balance of account {account_id} by {delta}: {error}");
    }
}

fn today() -> time::Date {
    OffsetDateTime::now_utc().date()
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod record_transaction_tests {
    use time::OffsetDateTime;

    use crate::{
        models::{TransactionKind, TransactionStatus},
        Error,
    };

    use super::record_transaction;
    use super::test_fixture::{draft, get_test_fixture, MEMBER, OWNER, STRANGER};

    #[test]
    fn paid_income_increases_balance() {
        let mut fixture = get_test_fixture();

        let transaction = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        assert_eq!(5000, transaction.amount);
        assert_eq!(5000, fixture.balance(fixture.account_id));
    }

    #[test]
    fn paid_expense_decreases_balance() {
        let mut fixture = get_test_fixture();

        let transaction = record_transaction(
            draft(
                fixture.account_id,
                2000,
                TransactionKind::Expense,
                TransactionStatus::Paid,
            ),
            MEMBER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        assert_eq!(-2000, transaction.amount);
        assert_eq!(-2000, fixture.balance(fixture.account_id));
    }

    #[test]
    fn pending_transaction_leaves_balance_unchanged() {
        let mut fixture = get_test_fixture();

        record_transaction(
            draft(
                fixture.account_id,
                1000,
                TransactionKind::Income,
                TransactionStatus::Pending,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        assert_eq!(0, fixture.balance(fixture.account_id));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let mut fixture = get_test_fixture();

        for amount in [0, -5000] {
            let result = record_transaction(
                draft(
                    fixture.account_id,
                    amount,
                    TransactionKind::Income,
                    TransactionStatus::Paid,
                ),
                OWNER,
                &fixture.organizations,
                &mut fixture.accounts,
                &mut fixture.transactions,
            );

            assert_eq!(Err(Error::InvalidAmount(amount)), result);
        }

        assert_eq!(0, fixture.balance(fixture.account_id));
    }

    #[test]
    fn rejects_future_date() {
        let mut fixture = get_test_fixture();
        let tomorrow = OffsetDateTime::now_utc().date().next_day().unwrap();
        let mut future_draft = draft(
            fixture.account_id,
            5000,
            TransactionKind::Income,
            TransactionStatus::Paid,
        );
        future_draft.date = tomorrow;

        let result = record_transaction(
            future_draft,
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        );

        assert_eq!(Err(Error::FutureDate(tomorrow)), result);
    }

    #[test]
    fn rejects_caller_outside_organization() {
        let mut fixture = get_test_fixture();

        let result = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            STRANGER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        );

        assert_eq!(Err(Error::NotAMember(fixture.organization_id)), result);
        assert_eq!(0, fixture.balance(fixture.account_id));
    }

    #[test]
    fn fails_on_missing_account() {
        let mut fixture = get_test_fixture();

        let result = record_transaction(
            draft(
                fixture.account_id + 1,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        );

        assert_eq!(Err(Error::NotFound), result);
    }

    #[test]
    fn balance_equals_signed_sum_of_paid_records() {
        let mut fixture = get_test_fixture();
        let amounts: [i64; 6] = [5000, -2000, 12345, -1, -99, 700];

        for amount in amounts {
            let kind = if amount >= 0 {
                TransactionKind::Income
            } else {
                TransactionKind::Expense
            };
            record_transaction(
                draft(fixture.account_id, amount.abs(), kind, TransactionStatus::Paid),
                OWNER,
                &fixture.organizations,
                &mut fixture.accounts,
                &mut fixture.transactions,
            )
            .unwrap();
        }

        let want: i64 = amounts.iter().sum();
        assert_eq!(want, fixture.balance(fixture.account_id));
    }

    #[test]
    fn concurrent_paid_records_do_not_lose_updates() {
        let fixture = get_test_fixture();
        let threads_count: i64 = 8;
        let records_per_thread: i64 = 10;

        let threads: Vec<_> = (0..threads_count)
            .map(|_| {
                let organizations = fixture.organizations.clone();
                let mut accounts = fixture.accounts.clone();
                let mut transactions = fixture.transactions.clone();
                let account_id = fixture.account_id;

                std::thread::spawn(move || {
                    for _ in 0..records_per_thread {
                        record_transaction(
                            draft(
                                account_id,
                                100,
                                TransactionKind::Income,
                                TransactionStatus::Paid,
                            ),
                            OWNER,
                            &organizations,
                            &mut accounts,
                            &mut transactions,
                        )
                        .unwrap();
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(
            threads_count * records_per_thread * 100,
            fixture.balance(fixture.account_id)
        );
    }
}

#[cfg(test)]
mod amend_transaction_tests {
    use crate::{
        models::{TransactionAmendment, TransactionKind, TransactionStatus},
        Error,
    };

    use super::{amend_transaction, record_transaction};
    use super::test_fixture::{draft, get_test_fixture, OWNER, STRANGER};

    #[test]
    fn pending_to_paid_applies_amount() {
        let mut fixture = get_test_fixture();
        let transaction = record_transaction(
            draft(
                fixture.account_id,
                1000,
                TransactionKind::Income,
                TransactionStatus::Pending,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();
        assert_eq!(0, fixture.balance(fixture.account_id));

        amend_transaction(
            transaction.id,
            TransactionAmendment {
                status: Some(TransactionStatus::Paid),
                ..Default::default()
            },
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        assert_eq!(1000, fixture.balance(fixture.account_id));
    }

    #[test]
    fn paid_to_pending_reverts_amount() {
        let mut fixture = get_test_fixture();
        let transaction = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        amend_transaction(
            transaction.id,
            TransactionAmendment {
                status: Some(TransactionStatus::Pending),
                ..Default::default()
            },
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        assert_eq!(0, fixture.balance(fixture.account_id));
    }

    #[test]
    fn amount_change_on_paid_applies_delta() {
        let mut fixture = get_test_fixture();
        let transaction = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        amend_transaction(
            transaction.id,
            TransactionAmendment {
                amount: Some(3000),
                ..Default::default()
            },
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        assert_eq!(3000, fixture.balance(fixture.account_id));
    }

    #[test]
    fn kind_change_flips_stored_sign() {
        let mut fixture = get_test_fixture();
        let transaction = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        let amended = amend_transaction(
            transaction.id,
            TransactionAmendment {
                kind: Some(TransactionKind::Expense),
                ..Default::default()
            },
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        assert_eq!(-5000, amended.amount);
        assert_eq!(-5000, fixture.balance(fixture.account_id));
    }

    #[test]
    fn amendment_on_pending_does_not_touch_balance() {
        let mut fixture = get_test_fixture();
        let transaction = record_transaction(
            draft(
                fixture.account_id,
                1000,
                TransactionKind::Income,
                TransactionStatus::Pending,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        amend_transaction(
            transaction.id,
            TransactionAmendment {
                amount: Some(9999),
                description: Some("Rust Pie".to_owned()),
                ..Default::default()
            },
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        assert_eq!(0, fixture.balance(fixture.account_id));
    }

    #[test]
    fn moving_paid_transaction_compensates_both_accounts() {
        let mut fixture = get_test_fixture();
        let second_account_id = fixture.second_account();
        let transaction = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        amend_transaction(
            transaction.id,
            TransactionAmendment {
                account_id: Some(second_account_id),
                ..Default::default()
            },
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        assert_eq!(0, fixture.balance(fixture.account_id));
        assert_eq!(5000, fixture.balance(second_account_id));
    }

    #[test]
    fn fails_on_missing_transaction() {
        let mut fixture = get_test_fixture();

        let result = amend_transaction(
            1337,
            TransactionAmendment::default(),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        );

        assert_eq!(Err(Error::NotFound), result);
    }

    #[test]
    fn rejects_non_positive_amount() {
        let mut fixture = get_test_fixture();
        let transaction = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        let result = amend_transaction(
            transaction.id,
            TransactionAmendment {
                amount: Some(0),
                ..Default::default()
            },
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        );

        assert_eq!(Err(Error::InvalidAmount(0)), result);
        assert_eq!(5000, fixture.balance(fixture.account_id));
    }

    #[test]
    fn rejects_caller_outside_organization() {
        let mut fixture = get_test_fixture();
        let transaction = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();

        let result = amend_transaction(
            transaction.id,
            TransactionAmendment {
                status: Some(TransactionStatus::Pending),
                ..Default::default()
            },
            STRANGER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        );

        assert_eq!(Err(Error::NotAMember(fixture.organization_id)), result);
        assert_eq!(5000, fixture.balance(fixture.account_id));
    }
}


#[cfg(test)]
mod balance_write_failure_tests {
    //! The balance adjustment is a secondary write: these tests inject a
    //! failing account store to check that the operations still report
    //! success and the transaction row writes go through.

    use crate::{
        database_id::{AccountId, OrganizationId},
        models::{Account, NewAccount, TransactionKind, TransactionStatus},
        stores::{sqlite::SQLiteAccountStore, AccountStore, TransactionStore},
        Error,
    };

    use super::{record_transaction, remove_transaction};
    use super::test_fixture::{draft, get_test_fixture, OWNER};

    /// Delegates everything to the SQLite store except balance adjustments,
    /// which always fail.
    #[derive(Clone)]
    struct FailingBalanceStore {
        inner: SQLiteAccountStore,
    }

    impl AccountStore for FailingBalanceStore {
        fn create(&mut self, account: NewAccount) -> Result<Account, Error> {
            self.inner.create(account)
        }

        fn get(&self, id: AccountId) -> Result<Account, Error> {
            self.inner.get(id)
        }

        fn get_by_organization(
            &self,
            organization_id: OrganizationId,
        ) -> Result<Vec<Account>, Error> {
            self.inner.get_by_organization(organization_id)
        }

        fn adjust_balance(&mut self, _id: AccountId, _delta: i64) -> Result<(), Error> {
            Err(Error::UpdateMissingAccount)
        }

        fn delete(&mut self, id: AccountId) -> Result<(), Error> {
            self.inner.delete(id)
        }
    }

    #[test]
    fn record_reports_success_when_balance_write_fails() {
        let mut fixture = get_test_fixture();
        let mut accounts = FailingBalanceStore {
            inner: fixture.accounts.clone(),
        };

        let transaction = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut accounts,
            &mut fixture.transactions,
        )
        .expect("a failed balance write must not fail the operation");

        // The transaction row exists while the cached balance is behind.
        assert_eq!(transaction, fixture.transactions.get(transaction.id).unwrap());
        assert_eq!(0, fixture.balance(fixture.account_id));
    }

    #[test]
    fn remove_reports_success_when_balance_write_fails() {
        let mut fixture = get_test_fixture();
        let transaction = record_transaction(
            draft(
                fixture.account_id,
                5000,
                TransactionKind::Income,
                TransactionStatus::Paid,
            ),
            OWNER,
            &fixture.organizations,
            &mut fixture.accounts,
            &mut fixture.transactions,
        )
        .unwrap();
        let mut accounts = FailingBalanceStore {
            inner: fixture.accounts.clone(),
        };

        remove_transaction(
            transaction.id,
            OWNER,
            &fixture.organizations,
            &mut accounts,
            &mut fixture.transactions,
        )
        .expect("a failed balance reversal must not fail the operation");

        // The row is deleted anyway; the stale contribution stays cached.
        assert_eq!(
            Err(Error::NotFound),
            fixture.transactions.get(transaction.id)
        );
        assert_eq!(5000, fixture.balance(fixture.account_id));
    }
}
