//! The endpoint for listing the categories visible to the current user.

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
    category::get_categories_for_budget,
    responses::data_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to list categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesState {
    /// The database connection for reading categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the system categories plus the categories of
/// the logged-in user's budget.
pub async fn list_categories_endpoint(
    State(state): State<ListCategoriesState>,
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

    match get_categories_for_budget(user.budget_id, &connection) {
        Ok(categories) => data_response(StatusCode::OK, categories),
        Err(error) => error.into_response(),
    }
}
