//! The endpoint for creating a custom category.

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
    category::create_category,
    responses::data_message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to create a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

/// A route handler for creating a custom category in the user's budget.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserId>,
    Json(category_data): Json<CreateCategoryData>,
) -> Response {
    if category_data.name.is_empty() {
        return Error::MissingField("category name").into_response();
    }
    if category_data.icon.is_empty() {
        return Error::MissingField("category icon").into_response();
    }
    if category_data.color.is_empty() {
        return Error::MissingField("category color").into_response();
    }

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

    match create_category(
        budget_id,
        &category_data.name,
        &category_data.color,
        &category_data.icon,
        &connection,
    ) {
        Ok(category) => {
            data_message_response(StatusCode::CREATED, category, "Category created successfully")
        }
        Err(error) => error.into_response(),
    }
}
