//! Defines the endpoint for creating a category budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::get_category_by_id,
    category_budget::{AllocationType, create_category_budget},
    database_id::DatabaseId,
    responses::data_message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to create a category budget.
#[derive(Debug, Clone)]
pub struct CreateCategoryBudgetState {
    /// The database connection for managing category budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a category budget.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryBudgetData {
    pub category_id: DatabaseId,
    /// The monthly amount in cents.
    pub amount: i64,
    pub allocation_type: Option<AllocationType>,
}

/// A route handler for creating a monthly budget for a category.
pub async fn create_category_budget_endpoint(
    State(state): State<CreateCategoryBudgetState>,
    Extension(user_id): Extension<UserId>,
    Json(budget_data): Json<CreateCategoryBudgetData>,
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

    // The category must exist and be visible to this budget.
    let category = match get_category_by_id(budget_data.category_id, &connection) {
        Ok(category) => category,
        Err(error) => return error.into_response(),
    };
    if let Some(owning_budget) = category.budget_id {
        if owning_budget != budget_id {
            return Error::AccessDenied.into_response();
        }
    }

    let allocation_type = budget_data.allocation_type.unwrap_or(AllocationType::Pooled);

    match create_category_budget(
        budget_id,
        budget_data.category_id,
        budget_data.amount,
        allocation_type,
        &connection,
    ) {
        Ok(category_budget) => data_message_response(
            StatusCode::CREATED,
            category_budget,
            "Budget created successfully",
        ),
        Err(error) => error.into_response(),
    }
}
