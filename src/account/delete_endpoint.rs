//! The endpoint for deleting an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{core::delete_account, get_account_for_budget},
    database_id::DatabaseId,
    responses::message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an account in the user's budget.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Extension(user_id): Extension<UserId>,
    Path(account_id): Path<DatabaseId>,
) -> Response {
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

    if let Err(error) = get_account_for_budget(account_id, user.budget_id, &connection) {
        return error.into_response();
    }

    match delete_account(account_id, &connection) {
        Ok(()) => message_response(StatusCode::OK, "Account deleted successfully"),
        Err(error) => error.into_response(),
    }
}
