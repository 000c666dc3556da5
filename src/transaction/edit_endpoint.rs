//! The endpoint for updating an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    responses::data_message_response,
    transaction::{
        core::update_transaction, create_endpoint::check_category_access, extract_merchant_name,
        get_transaction_by_id,
    },
    user::{UserId, get_user_by_id},
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating a transaction. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct EditTransactionData {
    pub amount: Option<i64>,
    pub description: Option<String>,
    pub category_id: Option<DatabaseId>,
    pub date: Option<Date>,
}

/// A route handler for updating a transaction.
///
/// Only the user that recorded a transaction may change it. Updating the
/// description re-derives the merchant name.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<DatabaseId>,
    Json(transaction_data): Json<EditTransactionData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let mut transaction = match get_transaction_by_id(transaction_id, &connection) {
        Ok(transaction) => transaction,
        Err(error) => return error.into_response(),
    };

    if transaction.user_id != user_id {
        return Error::AccessDenied.into_response();
    }

    if let Some(category_id) = transaction_data.category_id {
        let user = match get_user_by_id(user_id, &connection) {
            Ok(user) => user,
            Err(error) => return error.into_response(),
        };
        if let Err(error) = check_category_access(category_id, &user, &connection) {
            return error.into_response();
        }
        transaction.category_id = category_id;
    }

    if let Some(amount) = transaction_data.amount {
        transaction.amount = amount;
    }
    if let Some(description) = transaction_data.description {
        transaction.merchant_name = extract_merchant_name(&description);
        transaction.description = description;
    }
    if let Some(date) = transaction_data.date {
        transaction.date = date;
    }

    match update_transaction(&transaction, &connection) {
        Ok(()) => data_message_response(
            StatusCode::OK,
            transaction,
            "Transaction updated successfully",
        ),
        Err(error) => error.into_response(),
    }
}
