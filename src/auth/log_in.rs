//! The endpoint for logging in a user with their email and password.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie},
    responses::data_message_response,
    user::{User, get_user_by_email},
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl LoginState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: db_connection.clone(),
        }
    }
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client to log in.
#[derive(Debug, Deserialize)]
pub struct LogInData {
    /// The email the user registered with.
    pub email: String,
    /// The user's password in plain text.
    pub password: String,
    /// Whether to keep the session alive for a week instead of the default duration.
    #[serde(default)]
    pub remember_me: bool,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request the auth cookie is set and the user is
/// returned. Otherwise a 401 response is returned without revealing whether
/// the email or the password was wrong.
pub async fn log_in_endpoint(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<LogInData>,
) -> Response {
    let user: User = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_user_by_email(&credentials.email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Error::InvalidCredentials.into_response(),
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return error.into_response();
            }
        }
    };

    let is_password_valid = match user.password_hash.verify(&credentials.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return Error::HashingError(error.to_string()).into_response();
        }
    };

    if !is_password_valid {
        return Error::InvalidCredentials.into_response();
    }

    let cookie_duration = if credentials.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(updated_jar) => (
            updated_jar,
            data_message_response(StatusCode::OK, user, "Logged in successfully"),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                invalidate_auth_cookie(jar),
                Error::InvalidDateFormat(error.to_string(), "auth cookie expiry".to_owned())
                    .into_response(),
            )
                .into_response()
        }
    }
}
