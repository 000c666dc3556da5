//! The endpoint for deleting an expected income entry.

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
    income::{core::delete_expected_income, get_expected_income_by_id},
    responses::message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to delete an expected income.
#[derive(Debug, Clone)]
pub struct DeleteExpectedIncomeState {
    /// The database connection for managing expected income.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpectedIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an expected income in the user's budget.
pub async fn delete_expected_income_endpoint(
    State(state): State<DeleteExpectedIncomeState>,
    Extension(user_id): Extension<UserId>,
    Path(income_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let income = match get_expected_income_by_id(income_id, &connection) {
        Ok(income) => income,
        Err(error) => return error.into_response(),
    };

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    if user.budget_id != Some(income.budget_id) {
        return Error::AccessDenied.into_response();
    }

    match delete_expected_income(income_id, &connection) {
        Ok(()) => message_response(StatusCode::OK, "Expected income deleted successfully"),
        Err(error) => error.into_response(),
    }
}
