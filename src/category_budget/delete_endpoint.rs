//! The endpoint for deleting a category budget.

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
    category_budget::{core::delete_category_budget, get_category_budget_by_id},
    database_id::DatabaseId,
    responses::message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to delete a category budget.
#[derive(Debug, Clone)]
pub struct DeleteCategoryBudgetState {
    /// The database connection for managing category budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a category budget in the user's budget.
pub async fn delete_category_budget_endpoint(
    State(state): State<DeleteCategoryBudgetState>,
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

    let category_budget = match get_category_budget_by_id(category_budget_id, &connection) {
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

    match delete_category_budget(category_budget_id, &connection) {
        Ok(()) => message_response(StatusCode::OK, "Budget deleted successfully"),
        Err(error) => error.into_response(),
    }
}
