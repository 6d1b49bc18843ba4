//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of an organization (tenant) row.
pub type OrganizationId = i64;
/// The ID of an account row.
pub type AccountId = i64;
/// The ID of a category row.
pub type CategoryId = i64;
/// The ID of a transaction row.
pub type TransactionId = i64;

/// The identifier of an authenticated caller.
///
/// Identity is established outside this crate. Callers pass the ID through
/// and the authorization check compares it against membership rows.
pub type UserId = i64;
