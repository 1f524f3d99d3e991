//! Storage for the single trip budget.

use rusqlite::{Connection, OptionalExtension};

use crate::Error;

/// The budget a new trip starts with, in INR.
pub const DEFAULT_TOTAL_BUDGET: f64 = 100_000.0;

/// Create the table holding the trip budget.
///
/// The table holds at most one row, enforced by the `id = 1` check.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS trip_budget (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                total_budget REAL NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Get the trip budget, storing [DEFAULT_TOTAL_BUDGET] first if none has been set.
///
/// # Errors
/// Returns [Error::PermissionDenied] if the default cannot be written, or an SQL error.
pub fn get_budget(connection: &Connection) -> Result<f64, Error> {
    let stored: Option<f64> = connection
        .query_row("SELECT total_budget FROM trip_budget WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    match stored {
        Some(total_budget) => Ok(total_budget),
        None => {
            tracing::info!("No trip budget found, creating default of {DEFAULT_TOTAL_BUDGET}");
            connection.execute(
                "INSERT OR IGNORE INTO trip_budget (id, total_budget) VALUES (1, ?1)",
                (DEFAULT_TOTAL_BUDGET,),
            )?;

            Ok(DEFAULT_TOTAL_BUDGET)
        }
    }
}

/// Replace the trip budget. The last write wins.
///
/// # Errors
/// Returns:
/// - [Error::InvalidBudget] if `total_budget` is not a positive, finite number,
/// - [Error::PermissionDenied] if the database cannot be written to,
/// - or [Error::SqlError] for any other SQL error.
pub fn set_budget(total_budget: f64, connection: &Connection) -> Result<(), Error> {
    if !total_budget.is_finite() || total_budget <= 0.0 {
        return Err(Error::InvalidBudget(total_budget));
    }

    connection.execute(
        "INSERT INTO trip_budget (id, total_budget) VALUES (1, ?1)
         ON CONFLICT(id) DO UPDATE SET total_budget = excluded.total_budget",
        (total_budget,),
    )?;

    Ok(())
}
