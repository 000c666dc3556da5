//! The endpoint for fetching a single transaction.

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
    database_id::DatabaseId,
    responses::data_response,
    transaction::get_transaction_by_id,
    user::{UserId, get_user_by_id},
};

/// The state needed to fetch a transaction.
#[derive(Debug, Clone)]
pub struct GetTransactionState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns one transaction of the logged-in user's
/// budget. Any member of the budget may view it.
pub async fn get_transaction_endpoint(
    State(state): State<GetTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<DatabaseId>,
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

    let transaction = match get_transaction_by_id(transaction_id, &connection) {
        Ok(transaction) => transaction,
        Err(error) => return error.into_response(),
    };

    if user.budget_id != Some(transaction.budget_id) {
        return Error::AccessDenied.into_response();
    }

    data_response(StatusCode::OK, transaction)
}

#[cfg(test)]
mod get_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::create_category,
        db::initialize,
        test_utils::{insert_test_member, insert_test_user_with_budget},
        transaction::{NewTransaction, create_transaction},
        user::UserId,
    };

    use super::{GetTransactionState, get_transaction_endpoint};

    fn get_test_server(connection: Connection, user_id: UserId) -> TestServer {
        let state = GetTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(
                "/api/transactions/{transaction_id}",
                get(get_transaction_endpoint),
            )
            .layer(Extension(user_id))
            .with_state(state);

        TestServer::try_new(app).unwrap()
    }

    #[tokio::test]
    async fn budget_members_can_view_each_others_transactions() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, budget) = insert_test_user_with_budget(&connection, "foo@bar.baz");
        let member = insert_test_member(&connection, &budget, "member@bar.baz");
        let category = create_category(budget.id, "Food", "#FF0000", "🍔", &connection).unwrap();
        let transaction = create_transaction(
            NewTransaction {
                user_id: user.id,
                budget_id: budget.id,
                amount: -1250,
                description: "Burgers".to_owned(),
                category_id: category.id,
                date: date!(2024 - 08 - 07),
            },
            &connection,
        )
        .unwrap();

        let server = get_test_server(connection, member.id);
        let response = server
            .get(&format!("/api/transactions/{}", transaction.id))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["id"], transaction.id);
    }

    #[tokio::test]
    async fn outsiders_cannot_view_transactions() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, budget) = insert_test_user_with_budget(&connection, "foo@bar.baz");
        let (outsider, _) = insert_test_user_with_budget(&connection, "outsider@bar.baz");
        let category = create_category(budget.id, "Food", "#FF0000", "🍔", &connection).unwrap();
        let transaction = create_transaction(
            NewTransaction {
                user_id: user.id,
                budget_id: budget.id,
                amount: -1250,
                description: "Burgers".to_owned(),
                category_id: category.id,
                date: date!(2024 - 08 - 07),
            },
            &connection,
        )
        .unwrap();

        let server = get_test_server(connection, outsider.id);
        let response = server
            .get(&format!("/api/transactions/{}", transaction.id))
            .await;

        response.assert_status_forbidden();
    }
}
