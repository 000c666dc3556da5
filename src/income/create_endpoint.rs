//! Defines the endpoint for creating an expected income entry.

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
    income::{IncomeFrequency, core::NewExpectedIncome, create_expected_income},
    responses::data_message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to create an expected income.
#[derive(Debug, Clone)]
pub struct CreateExpectedIncomeState {
    /// The database connection for managing expected income.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpectedIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an expected income.
#[derive(Debug, Deserialize)]
pub struct CreateExpectedIncomeData {
    pub name: String,
    /// The amount in cents.
    pub amount: i64,
    pub frequency: IncomeFrequency,
    /// The next date the income is expected, e.g. "2024-09-01".
    pub next_date: Date,
}

/// A route handler for creating an expected income in the user's budget.
pub async fn create_expected_income_endpoint(
    State(state): State<CreateExpectedIncomeState>,
    Extension(user_id): Extension<UserId>,
    Json(income_data): Json<CreateExpectedIncomeData>,
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

    let new_income = NewExpectedIncome {
        budget_id,
        name: income_data.name,
        amount: income_data.amount,
        frequency: income_data.frequency,
        next_date: income_data.next_date,
    };

    match create_expected_income(new_income, &connection) {
        Ok(income) => data_message_response(
            StatusCode::CREATED,
            income,
            "Expected income created successfully",
        ),
        Err(error) => error.into_response(),
    }
}
