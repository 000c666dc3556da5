//! The endpoint for listing the members of the current user's budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    budget::BudgetRole,
    responses::data_response,
    user::{UserId, get_user_by_id, get_users_by_budget},
};

/// The state needed to list budget members.
#[derive(Debug, Clone)]
pub struct BudgetMembersState {
    /// The database connection for reading users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetMembersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// One member of a shared budget, as returned by the members endpoint.
#[derive(Debug, Serialize)]
pub struct BudgetMember {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub budget_role: BudgetRole,
    pub joined_at: OffsetDateTime,
}

/// A route handler that lists the members of the logged-in user's budget.
///
/// Users without a budget receive an empty list.
pub async fn get_budget_members_endpoint(
    State(state): State<BudgetMembersState>,
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
        return data_response(StatusCode::OK, Vec::<BudgetMember>::new());
    };

    match get_users_by_budget(budget_id, &connection) {
        Ok(users) => {
            let members: Vec<BudgetMember> = users
                .into_iter()
                .map(|member| BudgetMember {
                    user_id: member.id,
                    name: member.name,
                    email: member.email,
                    budget_role: member.budget_role,
                    joined_at: member.created_at,
                })
                .collect();

            data_response(StatusCode::OK, members)
        }
        Err(error) => error.into_response(),
    }
}
