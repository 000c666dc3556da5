//! The endpoint for updating an expected income entry.

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
    income::{IncomeFrequency, core::update_expected_income, get_expected_income_by_id},
    responses::data_message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to update an expected income.
#[derive(Debug, Clone)]
pub struct EditExpectedIncomeState {
    /// The database connection for managing expected income.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpectedIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating an expected income. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct EditExpectedIncomeData {
    pub name: Option<String>,
    pub amount: Option<i64>,
    pub frequency: Option<IncomeFrequency>,
    pub next_date: Option<Date>,
    pub is_active: Option<bool>,
}

/// A route handler for updating an expected income in the user's budget.
pub async fn edit_expected_income_endpoint(
    State(state): State<EditExpectedIncomeState>,
    Extension(user_id): Extension<UserId>,
    Path(income_id): Path<DatabaseId>,
    Json(income_data): Json<EditExpectedIncomeData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let mut income = match get_expected_income_by_id(income_id, &connection) {
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

    if let Some(name) = income_data.name {
        income.name = name;
    }
    if let Some(amount) = income_data.amount {
        income.amount = amount;
    }
    if let Some(frequency) = income_data.frequency {
        income.frequency = frequency;
    }
    if let Some(next_date) = income_data.next_date {
        income.next_date = next_date;
    }
    if let Some(is_active) = income_data.is_active {
        income.is_active = is_active;
    }

    match update_expected_income(&income, &connection) {
        Ok(()) => data_message_response(
            StatusCode::OK,
            income,
            "Expected income updated successfully",
        ),
        Err(error) => error.into_response(),
    }
}
