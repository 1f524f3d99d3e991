//! Defines the endpoint for changing the trip budget.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, alert::Alert, auth::Session, budget::set_budget, expense::FieldError,
    feed::LedgerFeed,
};

/// The state needed to change the budget.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection holding the budget.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Notified once the budget is stored.
    pub feed: LedgerFeed,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            feed: state.feed.clone(),
        }
    }
}

/// The form data for changing the budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    /// The new budget in INR, as typed.
    #[serde(default)]
    pub total_budget: String,
}

/// A route handler for replacing the trip budget.
///
/// Open dashboards pick up the new value through the feed, so the response is
/// only an alert confirming the change.
pub async fn update_budget_endpoint(
    State(state): State<BudgetState>,
    session: Session,
    Form(form): Form<BudgetForm>,
) -> Response {
    let Ok(total_budget) = form.total_budget.trim().parse::<f64>() else {
        return Error::Validation(vec![FieldError {
            field: "total_budget",
            message: "Enter a number.".to_owned(),
        }])
        .into_alert_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = set_budget(total_budget, &connection) {
        tracing::error!("could not set budget to {total_budget}: {error}");
        return error.into_alert_response();
    }

    tracing::info!("{} set the trip budget to {total_budget}", session.username);
    state.feed.refresh_budget(&connection);

    Alert::SuccessSimple {
        message: "Budget updated".to_owned(),
    }
    .into_html()
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        auth::{Session, UserID},
        budget::{core::DEFAULT_TOTAL_BUDGET, get_budget},
        db::initialize,
        feed::LedgerFeed,
        test_utils::{assert_status_ok, parse_html_fragment},
    };

    use super::{BudgetForm, BudgetState, update_budget_endpoint};

    fn get_state() -> BudgetState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let feed = LedgerFeed::new(&conn);

        BudgetState {
            db_connection: Arc::new(Mutex::new(conn)),
            feed,
        }
    }

    fn session() -> Session {
        Session {
            user_id: UserID::new(1),
            username: "priya".to_owned(),
            display_name: Some("Priya".to_owned()),
            is_admin: false,
        }
    }

    fn form(total_budget: &str) -> Form<BudgetForm> {
        Form(BudgetForm {
            total_budget: total_budget.to_owned(),
        })
    }

    #[tokio::test]
    async fn updates_budget_and_feed() {
        let state = get_state();

        let response = update_budget_endpoint(State(state.clone()), session(), form("150000")).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        assert!(html.root_element().text().any(|text| text.contains("Budget updated")));
        assert_eq!(state.feed.budget(), Ok(150_000.0));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_budget(&connection), Ok(150_000.0));
    }

    #[tokio::test]
    async fn rejects_invalid_budgets() {
        let state = get_state();

        for value in ["0", "-5", "lots", ""] {
            let response =
                update_budget_endpoint(State(state.clone()), session(), form(value)).await;

            assert_eq!(
                response.status(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "want 422 for {value:?}"
            );
        }

        assert_eq!(state.feed.budget(), Ok(DEFAULT_TOTAL_BUDGET));
    }
}
