//! The endpoint for listing a budget's expected income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    income::{ExpectedIncome, get_expected_income_by_budget},
    responses::data_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to list expected income.
#[derive(Debug, Clone)]
pub struct ListExpectedIncomeState {
    /// The database connection for reading expected income.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListExpectedIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the expected income of the logged-in user's
/// budget, soonest first. Users without a budget receive an empty list.
pub async fn list_expected_income_endpoint(
    State(state): State<ListExpectedIncomeState>,
    Extension(user_id): Extension<UserId>,
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
        return data_response(StatusCode::OK, Vec::<ExpectedIncome>::new());
    };

    match get_expected_income_by_budget(budget_id, &connection) {
        Ok(incomes) => data_response(StatusCode::OK, incomes),
        Err(error) => error.into_response(),
    }
}
