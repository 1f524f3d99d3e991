//! Database ID type definition.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The row ID of a stored expense.
pub type ExpenseId = DatabaseId;
