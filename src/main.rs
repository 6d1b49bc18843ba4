//! The pocketbook command line interface.
//!
//! Opens (or creates) a SQLite database file and runs one operation against
//! it per invocation, printing affected rows as JSON.

use std::{path::PathBuf, process::ExitCode, sync::{Arc, Mutex}};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use time::{Date, OffsetDateTime};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use pocketbook::{
    auth::{ensure_access, AccessLevel},
    database_id::{AccountId, CategoryId, OrganizationId, TransactionId, UserId},
    initialize_db,
    ledger::{amend_transaction, record_transaction, remove_transaction},
    models::{
        AccountKind, NewAccount, NewCategory, OrganizationRole, TransactionAmendment,
        TransactionDraft, TransactionKind, TransactionStatus,
    },
    services::{create_account, create_category, create_organization, delete_account, delete_category},
    stores::{
        sqlite::{
            SQLiteAccountStore, SQLiteCategoryStore, SQLiteOrganizationStore,
            SQLiteTransactionStore,
        },
        AccountStore, OrganizationStore, TransactionStore,
    },
};

#[derive(Debug, Parser)]
#[command(name = "pocketbook", about = "Multi-tenant personal finance ledger")]
struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, default_value = "pocketbook.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database file and schema.
    Init,

    /// Create an organization owned by the calling user.
    AddOrganization {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The name of the organization.
        #[arg(long)]
        name: String,
    },

    /// Add a user to an organization, or change their role. Requires the
    /// owner role.
    AddMember {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The organization to add the member to.
        #[arg(long)]
        organization: OrganizationId,
        /// The ID of the user to add.
        #[arg(long)]
        member: UserId,
        /// The role to grant: "member" or "owner".
        #[arg(long, default_value = "member", value_parser = parse_role)]
        role: OrganizationRole,
    },

    /// Create an account in an organization.
    AddAccount {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The organization the account belongs to.
        #[arg(long)]
        organization: OrganizationId,
        /// The name of the account.
        #[arg(long)]
        name: String,
        /// The kind of account: "bank", "cash", or "credit".
        #[arg(long, default_value = "bank", value_parser = parse_account_kind)]
        kind: AccountKind,
    },

    /// Delete an account. Requires the owner role.
    DeleteAccount {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The account to delete.
        #[arg(long)]
        account: AccountId,
    },

    /// Create a category in an organization.
    AddCategory {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The organization the category belongs to.
        #[arg(long)]
        organization: OrganizationId,
        /// The name of the category.
        #[arg(long)]
        name: String,
    },

    /// Delete a category. Requires the owner role.
    DeleteCategory {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The category to delete.
        #[arg(long)]
        category: CategoryId,
    },

    /// Record a transaction against an account.
    Record {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The account to record the transaction against.
        #[arg(long)]
        account: AccountId,
        /// The amount as a positive number of cents.
        #[arg(long)]
        amount: i64,
        /// The kind of transaction: "income" or "expense".
        #[arg(long, default_value = "expense", value_parser = parse_kind)]
        kind: TransactionKind,
        /// The settlement status: "pending" or "paid".
        #[arg(long, default_value = "paid", value_parser = parse_status)]
        status: TransactionStatus,
        /// The transaction date as YYYY-MM-DD. Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        /// A description of the transaction.
        #[arg(long, default_value = "")]
        description: String,
        /// The category the transaction belongs to.
        #[arg(long)]
        category: Option<CategoryId>,
    },

    /// Amend a transaction. Omitted fields are left unchanged.
    Amend {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The transaction to amend.
        #[arg(long)]
        transaction: TransactionId,
        /// Move the transaction to a different account.
        #[arg(long)]
        account: Option<AccountId>,
        /// Change the amount (positive number of cents).
        #[arg(long)]
        amount: Option<i64>,
        /// Change the kind: "income" or "expense".
        #[arg(long, value_parser = parse_kind)]
        kind: Option<TransactionKind>,
        /// Change the settlement status: "pending" or "paid".
        #[arg(long, value_parser = parse_status)]
        status: Option<TransactionStatus>,
        /// Change the transaction date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        /// Change the description.
        #[arg(long)]
        description: Option<String>,
        /// Move the transaction to a different category.
        #[arg(long, conflicts_with = "clear_category")]
        category: Option<CategoryId>,
        /// Detach the transaction from its category.
        #[arg(long)]
        clear_category: bool,
    },

    /// Remove a transaction.
    Remove {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The transaction to remove.
        #[arg(long)]
        transaction: TransactionId,
    },

    /// List an organization's accounts with their cached balances.
    Accounts {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The organization whose accounts to list.
        #[arg(long)]
        organization: OrganizationId,
    },

    /// List the transactions recorded against an account, oldest first.
    Transactions {
        /// The ID of the calling user.
        #[arg(long)]
        user: UserId,
        /// The account whose transactions to list.
        #[arg(long)]
        account: AccountId,
    },
}

fn parse_role(text: &str) -> Result<OrganizationRole, String> {
    OrganizationRole::parse(text)
        .ok_or_else(|| format!("expected \"member\" or \"owner\", got {text:?}"))
}

fn parse_account_kind(text: &str) -> Result<AccountKind, String> {
    AccountKind::parse(text)
        .ok_or_else(|| format!("expected \"bank\", \"cash\", or \"credit\", got {text:?}"))
}

fn parse_kind(text: &str) -> Result<TransactionKind, String> {
    TransactionKind::parse(text)
        .ok_or_else(|| format!("expected \"income\" or \"expense\", got {text:?}"))
}

fn parse_status(text: &str) -> Result<TransactionStatus, String> {
    TransactionStatus::parse(text)
        .ok_or_else(|| format!("expected \"pending\" or \"paid\", got {text:?}"))
}

fn parse_date(text: &str) -> Result<Date, String> {
    let format = time::macros::format_description!("[year]-[month]-[day]");

    Date::parse(text, &format).map_err(|error| error.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer().pretty().with_filter(
                filter::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| filter::EnvFilter::new("info")),
            ),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let connection = Connection::open(&cli.db)?;
    initialize_db(&connection)?;
    let connection = Arc::new(Mutex::new(connection));

    let mut organizations = SQLiteOrganizationStore::new(connection.clone());
    let mut accounts = SQLiteAccountStore::new(connection.clone());
    let mut categories = SQLiteCategoryStore::new(connection.clone());
    let mut transactions = SQLiteTransactionStore::new(connection);

    match cli.command {
        Command::Init => {
            tracing::info!("initialized database at {}", cli.db.display());
        }
        Command::AddOrganization { user, name } => {
            let organization = create_organization(&name, user, &mut organizations)?;
            print_json(&organization)?;
        }
        Command::AddMember {
            user,
            organization,
            member,
            role,
        } => {
            ensure_access(&organizations, organization, user, AccessLevel::Owner)?;
            organizations.add_member(organization, member, role)?;
        }
        Command::AddAccount {
            user,
            organization,
            name,
            kind,
        } => {
            let account = create_account(
                NewAccount {
                    organization_id: organization,
                    name,
                    kind,
                },
                user,
                &organizations,
                &mut accounts,
            )?;
            print_json(&account)?;
        }
        Command::DeleteAccount { user, account } => {
            delete_account(account, user, &organizations, &mut accounts)?;
        }
        Command::AddCategory {
            user,
            organization,
            name,
        } => {
            let category = create_category(
                NewCategory {
                    organization_id: organization,
                    name,
                },
                user,
                &organizations,
                &mut categories,
            )?;
            print_json(&category)?;
        }
        Command::DeleteCategory { user, category } => {
            delete_category(category, user, &organizations, &mut categories)?;
        }
        Command::Record {
            user,
            account,
            amount,
            kind,
            status,
            date,
            description,
            category,
        } => {
            let transaction = record_transaction(
                TransactionDraft {
                    account_id: account,
                    amount,
                    date: date.unwrap_or_else(|| OffsetDateTime::now_utc().date()),
                    description,
                    category_id: category,
                    kind,
                    status,
                },
                user,
                &organizations,
                &mut accounts,
                &mut transactions,
            )?;
            print_json(&transaction)?;
        }
        Command::Amend {
            user,
            transaction,
            account,
            amount,
            kind,
            status,
            date,
            description,
            category,
            clear_category,
        } => {
            let category_id = match (category, clear_category) {
                (Some(id), _) => Some(Some(id)),
                (None, true) => Some(None),
                (None, false) => None,
            };
            let amended = amend_transaction(
                transaction,
                TransactionAmendment {
                    account_id: account,
                    amount,
                    date,
                    description,
                    category_id,
                    kind,
                    status,
                },
                user,
                &organizations,
                &mut accounts,
                &mut transactions,
            )?;
            print_json(&amended)?;
        }
        Command::Remove { user, transaction } => {
            remove_transaction(
                transaction,
                user,
                &organizations,
                &mut accounts,
                &mut transactions,
            )?;
        }
        Command::Accounts { user, organization } => {
            ensure_access(&organizations, organization, user, AccessLevel::Member)?;
            print_json(&accounts.get_by_organization(organization)?)?;
        }
        Command::Transactions { user, account } => {
            let account_row = accounts.get(account)?;
            ensure_access(
                &organizations,
                account_row.organization_id,
                user,
                AccessLevel::Member,
            )?;
            print_json(&transactions.get_by_account(account)?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}
