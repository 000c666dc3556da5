//! Defines the endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{AccountKind, core::NewAccount, create_account},
    responses::data_message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountData {
    pub name: String,
    /// The account kind, e.g. "checking" or "credit_card".
    #[serde(rename = "type")]
    pub kind: String,
    /// The opening balance in cents.
    #[serde(default)]
    pub balance: i64,
    /// The ISO 4217 currency code; defaults to USD.
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub notes: String,
}

/// A route handler for creating a new account in the user's budget.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Extension(user_id): Extension<UserId>,
    Json(account_data): Json<CreateAccountData>,
) -> Response {
    let kind = match AccountKind::parse(&account_data.kind) {
        Ok(kind) => kind,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    let Some(budget_id) = user.budget_id else {
        return Error::NoBudget.into_response();
    };

    let currency = if account_data.currency.is_empty() {
        "USD".to_owned()
    } else {
        account_data.currency
    };

    let new_account = NewAccount {
        budget_id,
        name: account_data.name,
        kind,
        balance: account_data.balance,
        currency,
        notes: account_data.notes,
    };

    match create_account(new_account, &connection) {
        Ok(account) => {
            data_message_response(StatusCode::CREATED, account, "Account created successfully")
        }
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod create_account_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{db::initialize, test_utils::insert_test_user_with_budget, user::UserId};

    use super::{CreateAccountState, create_account_endpoint};

    fn get_test_server(connection: Connection, user_id: UserId) -> TestServer {
        let state = CreateAccountState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route("/api/accounts", post(create_account_endpoint))
            .layer(Extension(user_id))
            .with_state(state);

        TestServer::try_new(app).unwrap()
    }

    #[tokio::test]
    async fn can_create_account() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, budget) = insert_test_user_with_budget(&connection, "foo@bar.baz");

        let server = get_test_server(connection, user.id);
        let response = server
            .post("/api/accounts")
            .json(&serde_json::json!({
                "name": "Everyday",
                "type": "checking",
                "balance": 12345,
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["name"], "Everyday");
        assert_eq!(body["data"]["type"], "checking");
        assert_eq!(body["data"]["balance"], 12345);
        assert_eq!(body["data"]["currency"], "USD");
        assert_eq!(body["data"]["budget_id"], budget.id);
    }

    #[tokio::test]
    async fn create_account_rejects_unknown_kind() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = insert_test_user_with_budget(&connection, "foo@bar.baz");

        let server = get_test_server(connection, user.id);
        let response = server
            .post("/api/accounts")
            .json(&serde_json::json!({
                "name": "Vault",
                "type": "offshore",
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&serde_json::json!({ "error": "invalid account type" }));
    }
}
