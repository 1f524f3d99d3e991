//! Defines the endpoint for setting the current user's display name.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::name_page::display_name_fields,
    auth::{Session, set_display_name},
    endpoints,
};

const NAME_REQUIRED: &str = "Please enter your name.";

/// The state needed to change a display name.
#[derive(Debug, Clone)]
pub struct DisplayNameState {
    /// The database connection holding the users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DisplayNameState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DisplayNameForm {
    #[serde(default)]
    pub display_name: String,
}

/// A route handler for setting the display name, redirects to the dashboard on success.
///
/// Expenses already recorded keep the name they were recorded under.
pub async fn set_display_name_endpoint(
    State(state): State<DisplayNameState>,
    session: Session,
    Form(form): Form<DisplayNameForm>,
) -> Response {
    let display_name = form.display_name.trim();

    if display_name.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            display_name_fields(display_name, Some(NAME_REQUIRED)),
        )
            .into_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = set_display_name(session.user_id, display_name, &connection) {
        tracing::error!("could not set display name for {}: {error}", session.username);
        return error.into_alert_response();
    }

    tracing::info!("{} is now called {display_name}", session.username);

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
