//! The endpoint for updating an existing account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{AccountKind, core::update_account, get_account_for_budget},
    database_id::DatabaseId,
    responses::data_message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to update an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating an account. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct EditAccountData {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub balance: Option<i64>,
    pub currency: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

/// A route handler for updating an account in the user's budget.
pub async fn edit_account_endpoint(
    State(state): State<EditAccountState>,
    Extension(user_id): Extension<UserId>,
    Path(account_id): Path<DatabaseId>,
    Json(account_data): Json<EditAccountData>,
) -> Response {
    let kind = match &account_data.kind {
        Some(raw_kind) => match AccountKind::parse(raw_kind) {
            Ok(kind) => Some(kind),
            Err(error) => return error.into_response(),
        },
        None => None,
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

    let mut account = match get_account_for_budget(account_id, user.budget_id, &connection) {
        Ok(account) => account,
        Err(error) => return error.into_response(),
    };

    if let Some(name) = account_data.name {
        account.name = name;
    }
    if let Some(kind) = kind {
        account.kind = kind;
    }
    if let Some(balance) = account_data.balance {
        account.balance = balance;
    }
    if let Some(currency) = account_data.currency {
        account.currency = currency;
    }
    if let Some(is_active) = account_data.is_active {
        account.is_active = is_active;
    }
    if let Some(notes) = account_data.notes {
        account.notes = notes;
    }

    match update_account(&account, &connection) {
        Ok(()) => data_message_response(StatusCode::OK, account, "Account updated successfully"),
        Err(error) => error.into_response(),
    }
}
