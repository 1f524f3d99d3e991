//! The identity of the user making a request.

use axum::{extract::FromRequestParts, http::request::Parts};
use rusqlite::Connection;

use crate::{
    Error,
    auth::{UserID, get_user_by_id},
};

/// Who is making the current request.
///
/// The auth guard loads it once per request and places it in the request
/// extensions, so handlers behind the guard can take a `Session` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserID,
    pub username: String,
    /// The name shown to the rest of the group, unset until the user picks one.
    pub display_name: Option<String>,
    pub is_admin: bool,
}

impl Session {
    /// Load the session for `user_id` from the user table.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the user no longer exists, or an SQL error.
    pub fn load(user_id: UserID, connection: &Connection) -> Result<Self, Error> {
        let user = get_user_by_id(user_id, connection)?;

        Ok(Self {
            user_id: user.id,
            username: user.username,
            display_name: user.display_name,
            is_admin: user.is_admin,
        })
    }

    /// The display name if set, otherwise the username.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Up to two upper case initials of [Session::name].
    pub fn initials(&self) -> String {
        self.name()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            tracing::error!("No session in request extensions, is the auth guard missing?");
            Error::CookieMissing
        })
    }
}
