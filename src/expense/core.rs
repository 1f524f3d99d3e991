//! Defines the core data models and database queries for expenses.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, database_id::ExpenseId, expense::Category};

// ============================================================================
// MODELS
// ============================================================================

/// A single trip expense as it was stored.
///
/// Records are append-only: once stored they are never edited, so every
/// consumer works from an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// The ID assigned by the database.
    pub id: ExpenseId,
    /// What the money was spent on.
    pub description: String,
    /// Who was paid.
    pub paid_to: String,
    /// How to reach whoever was paid, if known.
    pub contact_info: Option<String>,
    /// The category identifier exactly as it was stored.
    ///
    /// Use [ExpenseRecord::category] to get the parsed category. Rows written
    /// by older versions of the app may hold identifiers that no longer parse.
    pub category: String,
    /// The full cost in INR.
    pub total_amount: f64,
    /// The part of the total paid up front, in INR.
    pub advance_paid: f64,
    /// `total_amount - advance_paid`, still owed to the payee.
    pub remaining_balance: f64,
    /// When the expense happened, in UTC.
    pub date: OffsetDateTime,
    /// The member of the group the expense belongs to.
    pub user_name: String,
}

impl ExpenseRecord {
    /// The parsed category, or `None` if the stored identifier is unknown.
    pub fn category(&self) -> Option<Category> {
        self.category.parse().ok()
    }
}

/// An expense that passed validation and is ready to be stored.
///
/// Create one with [crate::expense::validate_expense].
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub paid_to: String,
    pub contact_info: Option<String>,
    pub category: Category,
    pub total_amount: f64,
    pub advance_paid: f64,
    pub date: OffsetDateTime,
    pub user_name: String,
}

impl NewExpense {
    /// The amount still owed after the advance.
    pub fn remaining_balance(&self) -> f64 {
        self.total_amount - self.advance_paid
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                paid_to TEXT NOT NULL,
                contact_info TEXT,
                category TEXT NOT NULL,
                total_amount REAL NOT NULL,
                advance_paid REAL NOT NULL,
                remaining_balance REAL NOT NULL,
                date TEXT NOT NULL,
                user_name TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
        (),
    )?;

    Ok(())
}

/// Append a validated expense to the database.
///
/// The date is normalised to UTC so that rows sort chronologically.
///
/// # Errors
/// This function will return a:
/// - [Error::PermissionDenied] if the database cannot be written to,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(expense: NewExpense, connection: &Connection) -> Result<ExpenseRecord, Error> {
    let remaining_balance = expense.remaining_balance();
    let contact_info = expense
        .contact_info
        .filter(|contact_info| !contact_info.trim().is_empty());

    let record = connection
        .prepare(
            "INSERT INTO expense (description, paid_to, contact_info, category, total_amount,
                advance_paid, remaining_balance, date, user_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, description, paid_to, contact_info, category, total_amount,
                advance_paid, remaining_balance, date, user_name",
        )?
        .query_row(
            (
                expense.description,
                expense.paid_to,
                contact_info,
                expense.category.as_str(),
                expense.total_amount,
                expense.advance_paid,
                remaining_balance,
                expense.date.to_offset(UtcOffset::UTC),
                expense.user_name,
            ),
            map_expense_row,
        )?;

    Ok(record)
}

/// Get every stored expense, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<ExpenseRecord>, Error> {
    connection
        .prepare(
            "SELECT id, description, paid_to, contact_info, category, total_amount,
                advance_paid, remaining_balance, date, user_name
             FROM expense ORDER BY date DESC, id DESC",
        )?
        .query_map([], map_expense_row)?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

fn map_expense_row(row: &Row) -> Result<ExpenseRecord, rusqlite::Error> {
    Ok(ExpenseRecord {
        id: row.get(0)?,
        description: row.get(1)?,
        paid_to: row.get(2)?,
        contact_info: row.get(3)?,
        category: row.get(4)?,
        total_amount: row.get(5)?,
        advance_paid: row.get(6)?,
        remaining_balance: row.get(7)?,
        date: row.get(8)?,
        user_name: row.get(9)?,
    })
}

#[cfg(test)]
pub(crate) mod test_utils {
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        Error,
        expense::{Category, ExpenseRecord, NewExpense},
    };

    use super::{ExpenseId, map_expense_row};

    /// Retrieve an expense from the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored expense,
    /// - or [Error::SqlError] there is some other SQL error.
    pub(crate) fn get_expense(
        id: ExpenseId,
        connection: &Connection,
    ) -> Result<ExpenseRecord, Error> {
        let record = connection
            .prepare(
                "SELECT id, description, paid_to, contact_info, category, total_amount,
                    advance_paid, remaining_balance, date, user_name
                 FROM expense WHERE id = :id",
            )?
            .query_one(&[(":id", &id)], map_expense_row)?;

        Ok(record)
    }

    /// Get the total number of expenses in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is some SQL error.
    pub(crate) fn count_expenses(connection: &Connection) -> Result<u32, Error> {
        connection
            .query_row("SELECT COUNT(id) FROM expense;", [], |row| row.get(0))
            .map_err(|error| error.into())
    }

    /// An expense with sensible defaults for tests.
    pub(crate) fn new_expense(
        category: Category,
        total_amount: f64,
        advance_paid: f64,
        date: OffsetDateTime,
    ) -> NewExpense {
        NewExpense {
            description: "Houseboat".to_owned(),
            paid_to: "Kerala Tours".to_owned(),
            contact_info: None,
            category,
            total_amount,
            advance_paid,
            date,
            user_name: "Priya".to_owned(),
        }
    }
}
