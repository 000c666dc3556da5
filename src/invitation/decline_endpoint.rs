//! The endpoint for declining a budget invitation.

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
    invitation::decline_invitation,
    responses::message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to decline an invitation.
#[derive(Debug, Clone)]
pub struct DeclineInvitationState {
    /// The database connection for managing invitations.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeclineInvitationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that declines the invitation with the given token as the
/// logged-in user.
pub async fn decline_invitation_endpoint(
    State(state): State<DeclineInvitationState>,
    Extension(user_id): Extension<UserId>,
    Path(token): Path<String>,
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

    match decline_invitation(&token, &user, &connection) {
        Ok(()) => message_response(StatusCode::OK, "Invitation declined"),
        Err(error) => error.into_response(),
    }
}
