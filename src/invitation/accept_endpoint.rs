//! The endpoint for accepting a budget invitation.

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
    invitation::accept_invitation,
    responses::message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to accept an invitation.
#[derive(Debug, Clone)]
pub struct AcceptInvitationState {
    /// The database connection for managing invitations.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AcceptInvitationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that accepts the invitation with the given token as the
/// logged-in user, moving them into the inviting budget.
pub async fn accept_invitation_endpoint(
    State(state): State<AcceptInvitationState>,
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

    match accept_invitation(&token, &user, &connection) {
        Ok(()) => message_response(StatusCode::OK, "Invitation accepted successfully"),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod accept_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        budget::BudgetRole,
        db::initialize,
        invitation::create_invitation,
        test_utils::insert_test_user_with_budget,
        user::get_user_by_id,
    };

    use super::{AcceptInvitationState, accept_invitation_endpoint};

    #[tokio::test]
    async fn accepting_joins_the_budget() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (inviter, budget) = insert_test_user_with_budget(&connection, "inviter@example.com");
        let (invitee, _) = insert_test_user_with_budget(&connection, "invitee@example.com");
        let invitation = create_invitation(
            budget.id,
            inviter.id,
            "invitee@example.com",
            BudgetRole::ReadWrite,
            &connection,
        )
        .unwrap();

        let db_connection = Arc::new(Mutex::new(connection));
        let state = AcceptInvitationState {
            db_connection: db_connection.clone(),
        };
        let app = Router::new()
            .route(
                "/api/budget-invitations/{token}/accept",
                post(accept_invitation_endpoint),
            )
            .layer(Extension(invitee.id))
            .with_state(state);
        let server = TestServer::try_new(app).unwrap();

        let response = server
            .post(&format!(
                "/api/budget-invitations/{}/accept",
                invitation.token
            ))
            .await;

        response.assert_status_ok();
        response
            .assert_json(&serde_json::json!({ "message": "Invitation accepted successfully" }));

        let updated = get_user_by_id(invitee.id, &db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.budget_id, Some(budget.id));
    }

    #[tokio::test]
    async fn unknown_token_returns_not_found() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = insert_test_user_with_budget(&connection, "user@example.com");

        let state = AcceptInvitationState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(
                "/api/budget-invitations/{token}/accept",
                post(accept_invitation_endpoint),
            )
            .layer(Extension(user.id))
            .with_state(state);
        let server = TestServer::try_new(app).unwrap();

        let response = server
            .post("/api/budget-invitations/nosuchtoken/accept")
            .await;

        response.assert_status_not_found();
    }
}
