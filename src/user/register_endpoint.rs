//! The endpoint for registering a new user.
//!
//! Registration also provisions the user's personal budget so that a fresh
//! account can record transactions without any extra setup.

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
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::cookie::{DEFAULT_COOKIE_DURATION, set_auth_cookie},
    budget::{BudgetRole, create_budget},
    password::{PasswordHash, ValidatedPassword},
    responses::data_message_response,
    user::{NewUser, User, create_user, set_user_budget},
};

/// The name given to the budget created for a new user.
const DEFAULT_BUDGET_NAME: &str = "My Budget";

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The request body for registering a new user.
#[derive(Debug, Deserialize)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// A route handler for registering a new user.
///
/// On success the user is logged in right away: the auth cookie is set and
/// the new user is returned with status 201.
pub async fn register_user_endpoint(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Json(registration): Json<RegisterData>,
) -> Response {
    if registration.email.is_empty() {
        return Error::MissingField("email").into_response();
    }

    let validated_password = match ValidatedPassword::new(&registration.password) {
        Ok(password) => password,
        Err(error) => return error.into_response(),
    };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return error.into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let user = match register_user(&registration, password_hash, &connection) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(updated_jar) => (
            updated_jar,
            data_message_response(StatusCode::CREATED, user, "User registered successfully"),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            Error::InvalidDateFormat(error.to_string(), "auth cookie expiry".to_owned())
                .into_response()
        }
    }
}

/// Insert the new user along with their personal budget.
///
/// The user row is created first without a budget, then the budget (which
/// references its creator), and finally the user is made the budget's owner.
/// All three steps run in one SQL transaction.
///
/// # Errors
/// Returns [Error::DuplicateEmail] if the email is taken, or
/// [Error::SqlError] for other SQL errors.
pub fn register_user(
    registration: &RegisterData,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let mut user = create_user(
        NewUser {
            email: registration.email.clone(),
            name: registration
                .name
                .clone()
                .unwrap_or_else(|| "New User".to_owned()),
            password_hash,
            period_start_date: OffsetDateTime::now_utc().date(),
        },
        &sql_transaction,
    )?;

    let budget = create_budget(DEFAULT_BUDGET_NAME, user.id, &sql_transaction)?;
    set_user_budget(user.id, Some(budget.id), BudgetRole::Owner, &sql_transaction)?;

    sql_transaction.commit()?;

    user.budget_id = Some(budget.id);
    user.budget_role = BudgetRole::Owner;

    Ok(user)
}

#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{auth::cookie::COOKIE_USER_ID, db::initialize};

    use super::{RegistrationState, register_user_endpoint};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let state = RegistrationState::new("42", Arc::new(Mutex::new(connection)));
        let app = Router::new()
            .route("/api/users", post(register_user_endpoint))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn register_creates_user_with_personal_budget() {
        let server = get_test_server();

        let response = server
            .post("/api/users")
            .json(&serde_json::json!({
                "email": "foo@bar.baz",
                "password": "averystrongandlongpassword",
                "name": "Foo Bar",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        assert!(!response.cookie(COOKIE_USER_ID).value().is_empty());

        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["email"], "foo@bar.baz");
        assert_eq!(body["data"]["name"], "Foo Bar");
        assert_eq!(body["data"]["budget_role"], "owner");
        assert!(body["data"]["budget_id"].is_i64());
    }

    #[tokio::test]
    async fn register_rejects_weak_password() {
        let server = get_test_server();

        let response = server
            .post("/api/users")
            .json(&serde_json::json!({
                "email": "foo@bar.baz",
                "password": "hunter2",
            }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("password is too weak"),
            "unexpected error: {body}"
        );
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let server = get_test_server();
        let registration = serde_json::json!({
            "email": "foo@bar.baz",
            "password": "averystrongandlongpassword",
        });

        server.post("/api/users").json(&registration).await;
        let response = server.post("/api/users").json(&registration).await;

        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_rejects_empty_email() {
        let server = get_test_server();

        let response = server
            .post("/api/users")
            .json(&serde_json::json!({
                "email": "",
                "password": "averystrongandlongpassword",
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&serde_json::json!({ "error": "email is required" }));
    }
}
