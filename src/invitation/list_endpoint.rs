//! The endpoint for listing the current user's pending invitations.

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
    invitation::get_pending_invitations_for_email,
    responses::data_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to list invitations.
#[derive(Debug, Clone)]
pub struct ListInvitationsState {
    /// The database connection for reading invitations.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListInvitationsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the pending invitations addressed to the
/// logged-in user's email.
pub async fn list_invitations_endpoint(
    State(state): State<ListInvitationsState>,
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

    match get_pending_invitations_for_email(&user.email, &connection) {
        Ok(invitations) => data_response(StatusCode::OK, invitations),
        Err(error) => error.into_response(),
    }
}
