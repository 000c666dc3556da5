//! The endpoint for listing the category budgets of the current user's budget.

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
    category_budget::{CategoryBudget, get_category_budgets_by_budget},
    responses::data_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to list category budgets.
#[derive(Debug, Clone)]
pub struct ListCategoryBudgetsState {
    /// The database connection for reading category budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoryBudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the category budgets of the logged-in user's
/// budget. Users without a budget receive an empty list.
pub async fn list_category_budgets_endpoint(
    State(state): State<ListCategoryBudgetsState>,
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
        return data_response(StatusCode::OK, Vec::<CategoryBudget>::new());
    };

    match get_category_budgets_by_budget(budget_id, &connection) {
        Ok(category_budgets) => data_response(StatusCode::OK, category_budgets),
        Err(error) => error.into_response(),
    }
}
