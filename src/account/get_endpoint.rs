//! The endpoint for fetching a single account.

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
    account::get_account_for_budget,
    database_id::DatabaseId,
    responses::data_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to fetch an account.
#[derive(Debug, Clone)]
pub struct GetAccountState {
    /// The database connection for reading accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns one account of the logged-in user's budget.
pub async fn get_account_endpoint(
    State(state): State<GetAccountState>,
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

    match get_account_for_budget(account_id, user.budget_id, &connection) {
        Ok(account) => data_response(StatusCode::OK, account),
        Err(error) => error.into_response(),
    }
}
