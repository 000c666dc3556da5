//! The endpoint for updating a category budget.

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
    category_budget::{AllocationType, core::update_category_budget, get_category_budget_by_id},
    database_id::DatabaseId,
    responses::data_message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to update a category budget.
#[derive(Debug, Clone)]
pub struct EditCategoryBudgetState {
    /// The database connection for managing category budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating a category budget. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct EditCategoryBudgetData {
    /// The new monthly amount in cents.
    pub amount: Option<i64>,
    pub allocation_type: Option<AllocationType>,
}

/// A route handler for updating a category budget in the user's budget.
pub async fn edit_category_budget_endpoint(
    State(state): State<EditCategoryBudgetState>,
    Extension(user_id): Extension<UserId>,
    Path(category_budget_id): Path<DatabaseId>,
    Json(budget_data): Json<EditCategoryBudgetData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let mut category_budget = match get_category_budget_by_id(category_budget_id, &connection) {
        Ok(category_budget) => category_budget,
        Err(error) => return error.into_response(),
    };

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    if user.budget_id != Some(category_budget.budget_id) {
        return Error::AccessDenied.into_response();
    }

    if let Some(amount) = budget_data.amount {
        category_budget.amount = amount;
    }
    if let Some(allocation_type) = budget_data.allocation_type {
        category_budget.allocation_type = allocation_type;
    }

    match update_category_budget(&category_budget, &connection) {
        Ok(()) => data_message_response(
            StatusCode::OK,
            category_budget,
            "Budget updated successfully",
        ),
        Err(error) => error.into_response(),
    }
}
