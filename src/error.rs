//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::ErrorCode;

use crate::{
    alert::Alert, endpoints, expense::FieldError, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// One or more fields of a submitted form were invalid.
    #[error("invalid form fields: {0:?}")]
    Validation(Vec<FieldError>),

    /// The user tried to record an expense before choosing a display name.
    #[error("the user has not set a display name")]
    NameNotSet,

    /// Exchange rates could not be obtained.
    #[error("exchange rates are unavailable: {0}")]
    ProviderUnavailable(String),

    /// The database refused a read or write.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The trip budget must be a positive number.
    #[error("{0} is not a valid budget")]
    InvalidBudget(f64),

    /// The username is already taken.
    #[error("the username \"{0}\" already exists")]
    DuplicateUsername(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, ref description)
                if matches!(
                    sql_error.code,
                    ErrorCode::ReadOnly
                        | ErrorCode::PermissionDenied
                        | ErrorCode::AuthorizationForStatementDenied
                        | ErrorCode::CannotOpen
                ) =>
            {
                let reason = description
                    .clone()
                    .unwrap_or_else(|| sql_error.to_string());
                tracing::error!("the database denied access: {reason}");
                Error::PermissionDenied(reason)
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::PermissionDenied(_) => InternalServerError {
                description: "Permission Denied",
                fix: "The server could not access the trip data. Check that the database file \
                    is readable and writable by the server.",
            }
            .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Check the form".to_owned(),
                    details: errors
                        .into_iter()
                        .map(|error| error.message)
                        .collect::<Vec<_>>()
                        .join(" "),
                },
            ),
            Error::NameNotSet => (
                StatusCode::CONFLICT,
                Alert::ErrorWithLink {
                    message: "Set your name first".to_owned(),
                    details: "Expenses are recorded under your name.".to_owned(),
                    url: endpoints::ACCOUNT_NAME_VIEW,
                    link_text: "Set your name",
                },
            ),
            Error::ProviderUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Alert::Error {
                    message: "Exchange rates unavailable".to_owned(),
                    details: "Currency conversion is not available right now.".to_owned(),
                },
            ),
            Error::PermissionDenied(_) => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: "Permission denied".to_owned(),
                    details: "The server could not save your changes. \
                        Check the server logs for more details."
                        .to_owned(),
                },
            ),
            Error::InvalidBudget(value) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid budget".to_owned(),
                    details: format!("The budget must be a positive amount, got {value}."),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::{Connection, OpenFlags, ffi};

    use crate::expense::FieldError;

    use super::Error;

    #[test]
    fn read_only_failure_is_permission_denied() {
        let sql_error = rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_READONLY),
            Some("attempt to write a readonly database".to_owned()),
        );

        assert_eq!(
            Error::from(sql_error),
            Error::PermissionDenied("attempt to write a readonly database".to_owned())
        );
    }

    #[test]
    fn writing_to_read_only_database_is_permission_denied() {
        let path = std::env::temp_dir().join(format!(
            "budget_buddy_read_only_{}.db",
            std::process::id()
        ));
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("CREATE TABLE IF NOT EXISTS t (x INTEGER)", ())
                .unwrap();
        }
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();

        let result: Result<usize, Error> = conn
            .execute("INSERT INTO t (x) VALUES (1)", ())
            .map_err(Error::from);

        drop(conn);
        let _ = std::fs::remove_file(&path);
        assert!(
            matches!(result, Err(Error::PermissionDenied(_))),
            "want permission denied, got {result:?}"
        );
    }

    #[test]
    fn no_rows_is_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn validation_alert_is_unprocessable() {
        let response = Error::Validation(vec![FieldError {
            field: "description",
            message: "Description must be at least 2 characters.".to_owned(),
        }])
        .into_alert_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn permission_denied_page_is_server_error() {
        let response = Error::PermissionDenied("readonly".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn alert_statuses_match_error_kind() {
        let cases = [
            (Error::NameNotSet, StatusCode::CONFLICT),
            (
                Error::ProviderUnavailable("timeout".to_owned()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                Error::PermissionDenied("readonly".to_owned()),
                StatusCode::FORBIDDEN,
            ),
            (Error::InvalidBudget(-1.0), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::DatabaseLockError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, want_status) in cases {
            let description = error.to_string();
            let response = error.into_alert_response();

            assert_eq!(response.status(), want_status, "for error \"{description}\"");
        }
    }
}
