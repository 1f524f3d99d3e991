//! Guards for the routes only members of the trip group may use.
//!
//! A guard reads the encrypted auth cookie, loads the caller's [Session] and
//! stores it in the request extensions, where the [Session] extractor picks
//! it up. Requests without a usable session are sent to the log-in page along
//! with the page they came from, so the user lands back there afterwards.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        Session,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed for the auth guards.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session lasts after the latest request.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// The user table the session is loaded from.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How a guard sends a client without a session to the log-in page.
#[derive(Debug, Clone, Copy)]
enum LogInRedirect {
    /// A 303 redirect, for full page loads.
    Page,
    /// An `HX-Redirect` header, for requests made by htmx.
    Htmx,
}

impl LogInRedirect {
    fn to(self, url: &str) -> Response {
        match self {
            LogInRedirect::Page => Redirect::to(url).into_response(),
            LogInRedirect::Htmx => (HxRedirect(url.to_owned()), StatusCode::OK).into_response(),
        }
    }
}

/// Only let requests from logged-in users through to page routes.
///
/// Handlers behind this guard can take a [Session] argument.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, LogInRedirect::Page).await
}

/// Only let requests from logged-in users through to the htmx API routes.
///
/// Same as [auth_guard], but clients are redirected with `HX-Redirect`
/// back to the page that made the request.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, LogInRedirect::Htmx).await
}

async fn guard(
    state: AuthState,
    mut request: Request,
    next: Next,
    log_in_redirect: LogInRedirect,
) -> Response {
    let jar = PrivateCookieJar::from_headers(request.headers(), state.cookie_key.clone());

    let session = match load_session(&state, &jar) {
        Ok(session) => session,
        Err(Error::CookieMissing | Error::InvalidCredentials | Error::NotFound) => {
            return log_in_redirect.to(&log_in_url(&request));
        }
        Err(error) => {
            tracing::error!("could not load session: {error}");
            return error.into_response();
        }
    };

    request.extensions_mut().insert(session);
    let response = next.run(request).await;

    refresh_auth_cookie(&state, jar, response)
}

/// Load the session of the user named by the auth token in `jar`.
///
/// # Errors
/// Returns [Error::CookieMissing] or [Error::InvalidCredentials] if there is
/// no valid token, [Error::NotFound] if the user has since been removed, or
/// [Error::DatabaseLockError].
fn load_session(state: &AuthState, jar: &PrivateCookieJar) -> Result<Session, Error> {
    let token = get_token_from_cookies(jar)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    Session::load(token.user_id, &connection)
}

fn log_in_url(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        tracing::warn!(
            "No return URL for {}, falling back to the dashboard.",
            request.uri().path()
        );

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

/// Push the auth cookie's expiry out to [AuthState::cookie_duration] from now
/// and add the new cookie to `response`.
fn refresh_auth_cookie(state: &AuthState, jar: PrivateCookieJar, response: Response) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!(
            "Invalid timezone {}, the auth cookie was not extended.",
            state.local_timezone
        );
        return response;
    };

    let jar = match extend_auth_cookie_duration_if_needed(jar, state.cookie_duration, local_offset)
    {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not extend the auth cookie: {error}");
            return response;
        }
    };

    let cookies = jar.into_response();
    let (mut parts, body) = response.into_parts();
    for cookie in cookies.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, cookie.clone());
    }

    Response::from_parts(parts, body)
}
