//! The endpoint for inviting someone to a shared budget.

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
    budget::BudgetRole,
    database_id::DatabaseId,
    invitation::create_invitation,
    responses::data_message_response,
    user::{UserId, get_user_by_id},
};

/// The state needed to create an invitation.
#[derive(Debug, Clone)]
pub struct InviteState {
    /// The database connection for managing invitations.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for InviteState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for inviting someone to a budget.
#[derive(Debug, Deserialize)]
pub struct InviteData {
    #[serde(default)]
    pub invitee_email: String,
    /// The role to grant; defaults to read_write when empty.
    #[serde(default)]
    pub invited_role: String,
}

/// A route handler that invites an email address to join the budget
/// `budget_id`. The inviter must be a member of that budget.
pub async fn invite_to_budget_endpoint(
    State(state): State<InviteState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<DatabaseId>,
    Json(invite_data): Json<InviteData>,
) -> Response {
    if invite_data.invitee_email.is_empty() {
        return Error::MissingField("email").into_response();
    }

    let invited_role = match BudgetRole::parse_invited(&invite_data.invited_role) {
        Ok(role) => role,
        Err(error) => return error.into_response(),
    };

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

    if user.budget_id != Some(budget_id) {
        return Error::AccessDenied.into_response();
    }

    match create_invitation(
        budget_id,
        user.id,
        &invite_data.invitee_email,
        invited_role,
        &connection,
    ) {
        Ok(invitation) => data_message_response(
            StatusCode::CREATED,
            invitation,
            "Invitation sent successfully",
        ),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod invite_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{db::initialize, test_utils::insert_test_user_with_budget, user::UserId};

    use super::{InviteState, invite_to_budget_endpoint};

    fn get_test_server(connection: Connection, user_id: UserId) -> TestServer {
        let state = InviteState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(
                "/api/budgets/{budget_id}/invite",
                post(invite_to_budget_endpoint),
            )
            .layer(Extension(user_id))
            .with_state(state);

        TestServer::try_new(app).unwrap()
    }

    #[tokio::test]
    async fn can_invite_by_email() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, budget) = insert_test_user_with_budget(&connection, "inviter@example.com");

        let server = get_test_server(connection, user.id);
        let response = server
            .post(&format!("/api/budgets/{}/invite", budget.id))
            .json(&serde_json::json!({
                "invitee_email": "friend@example.com",
                "invited_role": "read_only",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["invitee_email"], "friend@example.com");
        assert_eq!(body["data"]["invited_role"], "read_only");
        assert_eq!(body["data"]["status"], "pending");
        assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cannot_invite_to_a_budget_you_are_not_in() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = insert_test_user_with_budget(&connection, "inviter@example.com");
        let (_, other_budget) = insert_test_user_with_budget(&connection, "other@example.com");

        let server = get_test_server(connection, user.id);
        let response = server
            .post(&format!("/api/budgets/{}/invite", other_budget.id))
            .json(&serde_json::json!({ "invitee_email": "friend@example.com" }))
            .await;

        response.assert_status_forbidden();
    }

    #[tokio::test]
    async fn invalid_role_is_rejected() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, budget) = insert_test_user_with_budget(&connection, "inviter@example.com");

        let server = get_test_server(connection, user.id);
        let response = server
            .post(&format!("/api/budgets/{}/invite", budget.id))
            .json(&serde_json::json!({
                "invitee_email": "friend@example.com",
                "invited_role": "owner",
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&serde_json::json!({ "error": "invalid role" }));
    }
}
