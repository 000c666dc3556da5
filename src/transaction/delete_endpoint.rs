//! The endpoint for deleting a transaction.

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
    database_id::DatabaseId,
    responses::message_response,
    transaction::{core::delete_transaction, get_transaction_by_id},
    user::UserId,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Only the user that recorded a transaction may delete it.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let transaction = match get_transaction_by_id(transaction_id, &connection) {
        Ok(transaction) => transaction,
        Err(error) => return error.into_response(),
    };

    if transaction.user_id != user_id {
        return Error::AccessDenied.into_response();
    }

    match delete_transaction(transaction_id, &connection) {
        Ok(()) => message_response(StatusCode::OK, "Transaction deleted successfully"),
        Err(error) => error.into_response(),
    }
}
