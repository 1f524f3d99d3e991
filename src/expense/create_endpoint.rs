//! Defines the endpoint for recording a new expense.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Session,
    endpoints,
    expense::{
        RawExpenseInput, create_expense,
        form::{ExpenseFormValues, expense_form_fields},
        validate_expense,
    },
    feed::LedgerFeed,
    timezone::get_local_offset,
};

/// The state needed to record an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for storing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// Notified once the expense is stored.
    pub feed: LedgerFeed,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            feed: state.feed.clone(),
        }
    }
}

/// A route handler for recording an expense, redirects to the dashboard on success.
///
/// Invalid input re-renders the form fields with the errors and status 422.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    session: Session,
    Form(input): Form<RawExpenseInput>,
) -> Response {
    let Some(local_timezone) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let now = time::OffsetDateTime::now_utc().to_offset(local_timezone);

    let expense = match validate_expense(input.clone(), &session, now) {
        Ok(expense) => expense,
        Err(Error::Validation(errors)) => {
            tracing::debug!("rejected expense from {}: {errors:?}", session.username);
            let fields = expense_form_fields(&ExpenseFormValues {
                input: &input,
                errors: &errors,
                is_admin: session.is_admin,
                max_date: now.date(),
            });

            return (StatusCode::UNPROCESSABLE_ENTITY, fields).into_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_expense(expense, &connection) {
        Ok(record) => tracing::info!(
            "{} recorded expense {} for {}",
            session.username,
            record.id,
            record.user_name
        ),
        Err(error) => {
            tracing::error!("could not create expense: {error}");
            return error.into_alert_response();
        }
    }

    state.feed.refresh_expenses(&connection);

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
