//! Defines the endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    category::get_category_by_id,
    database_id::DatabaseId,
    responses::data_message_response,
    transaction::{NewTransaction, create_transaction},
    user::{User, UserId, get_user_by_id},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionData {
    /// The amount in cents. Negative for expenses.
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    pub category_id: DatabaseId,
    /// The date the transaction happened, e.g. "2024-08-07".
    pub date: Date,
}

/// A route handler for recording a new transaction in the user's budget.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserId>,
    Json(transaction_data): Json<CreateTransactionData>,
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

    let Some(budget_id) = user.budget_id else {
        return Error::NoBudget.into_response();
    };

    if let Err(error) = check_category_access(transaction_data.category_id, &user, &connection) {
        return error.into_response();
    }

    let new_transaction = NewTransaction {
        user_id: user.id,
        budget_id,
        amount: transaction_data.amount,
        description: transaction_data.description,
        category_id: transaction_data.category_id,
        date: transaction_data.date,
    };

    match create_transaction(new_transaction, &connection) {
        Ok(transaction) => data_message_response(
            StatusCode::CREATED,
            transaction,
            "Transaction created successfully",
        ),
        Err(error) => error.into_response(),
    }
}

/// Check that `category_id` refers to a category the user may file
/// transactions under: a system category or one of their budget's own.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist, or
/// [Error::AccessDenied] if it belongs to a different budget.
pub(super) fn check_category_access(
    category_id: DatabaseId,
    user: &User,
    connection: &Connection,
) -> Result<(), Error> {
    let category = get_category_by_id(category_id, connection)?;

    match category.budget_id {
        None => Ok(()),
        Some(owning_budget) if Some(owning_budget) == user.budget_id => Ok(()),
        Some(_) => Err(Error::AccessDenied),
    }
}
