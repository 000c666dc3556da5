//! Endpoints for reading and replacing the member splits of a category
//! budget.

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
    category_budget::{
        CategoryBudget, SplitInput, get_category_budget_by_id, get_splits_for_category_budget,
        replace_splits,
    },
    database_id::DatabaseId,
    responses::{data_message_response, data_response},
    user::{UserId, get_user_by_id},
};

/// The state needed to read or replace splits.
#[derive(Debug, Clone)]
pub struct SplitsState {
    /// The database connection for managing splits.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SplitsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Load the category budget and check the user belongs to its budget.
fn get_category_budget_checked(
    category_budget_id: DatabaseId,
    user_id: UserId,
    connection: &Connection,
) -> Result<CategoryBudget, Error> {
    let category_budget = get_category_budget_by_id(category_budget_id, connection)?;
    let user = get_user_by_id(user_id, connection)?;

    if user.budget_id != Some(category_budget.budget_id) {
        return Err(Error::AccessDenied);
    }

    Ok(category_budget)
}

/// A route handler that lists the splits of a category budget.
pub async fn get_splits_endpoint(
    State(state): State<SplitsState>,
    Extension(user_id): Extension<UserId>,
    Path(category_budget_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    if let Err(error) = get_category_budget_checked(category_budget_id, user_id, &connection) {
        return error.into_response();
    }

    match get_splits_for_category_budget(category_budget_id, &connection) {
        Ok(splits) => data_response(StatusCode::OK, splits),
        Err(error) => error.into_response(),
    }
}

/// The request body for replacing the splits of a category budget.
#[derive(Debug, Deserialize)]
pub struct UpdateSplitsData {
    pub splits: Vec<SplitInput>,
}

/// A route handler that replaces the splits of a category budget and marks
/// the budget as split.
pub async fn update_splits_endpoint(
    State(state): State<SplitsState>,
    Extension(user_id): Extension<UserId>,
    Path(category_budget_id): Path<DatabaseId>,
    Json(splits_data): Json<UpdateSplitsData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let category_budget =
        match get_category_budget_checked(category_budget_id, user_id, &connection) {
            Ok(category_budget) => category_budget,
            Err(error) => return error.into_response(),
        };

    match replace_splits(
        category_budget.id,
        category_budget.budget_id,
        &splits_data.splits,
        &connection,
    ) {
        Ok(splits) => data_message_response(StatusCode::OK, splits, "Splits updated successfully"),
        Err(error) => error.into_response(),
    }
}
