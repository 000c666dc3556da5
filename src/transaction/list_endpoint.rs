//! The endpoint for listing a budget's transactions with optional filters.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    pagination::{Page, PaginationConfig},
    responses::data_response,
    transaction::{Transaction, TransactionFilter, get_transactions_page},
    user::{UserId, get_user_by_id},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters accepted by the transaction list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    pub category_id: Option<DatabaseId>,
    pub user_id: Option<i64>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// A route handler that lists the transactions of the logged-in user's
/// budget, filtered and paginated.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<ListTransactionsQuery>,
) -> Response {
    let page = query.page.unwrap_or(state.pagination_config.default_page).max(1);
    let per_page = query
        .per_page
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);

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
        return data_response(
            StatusCode::OK,
            Page::<Transaction>::new(vec![], page, per_page, 0),
        );
    };

    let filter = TransactionFilter {
        category_id: query.category_id,
        user_id: query.user_id.map(UserId::new),
        start_date: query.start_date,
        end_date: query.end_date,
    };

    match get_transactions_page(budget_id, &filter, page, per_page, &connection) {
        Ok((transactions, total)) => data_response(
            StatusCode::OK,
            Page::new(transactions, page, per_page, total),
        ),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod list_transactions_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::create_category,
        db::initialize,
        pagination::PaginationConfig,
        test_utils::insert_test_user_with_budget,
        transaction::{NewTransaction, create_transaction},
        user::UserId,
    };

    use super::{ListTransactionsState, list_transactions_endpoint};

    fn get_test_server(connection: Connection, user_id: UserId) -> TestServer {
        let state = ListTransactionsState {
            db_connection: Arc::new(Mutex::new(connection)),
            pagination_config: PaginationConfig::default(),
        };
        let app = Router::new()
            .route("/api/transactions", get(list_transactions_endpoint))
            .layer(Extension(user_id))
            .with_state(state);

        TestServer::try_new(app).unwrap()
    }

    #[tokio::test]
    async fn list_returns_paginated_envelope() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, budget) = insert_test_user_with_budget(&connection, "foo@bar.baz");
        let category = create_category(budget.id, "Food", "#FF0000", "🍔", &connection).unwrap();

        for i in 0..3 {
            create_transaction(
                NewTransaction {
                    user_id: user.id,
                    budget_id: budget.id,
                    amount: -(100 * (i + 1)),
                    description: format!("meal #{i}"),
                    category_id: category.id,
                    date: date!(2024 - 08 - 01),
                },
                &connection,
            )
            .unwrap();
        }

        let server = get_test_server(connection, user.id);
        let response = server.get("/api/transactions").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["total"], 3);
        assert_eq!(body["data"]["page"], 1);
        assert_eq!(body["data"]["total_pages"], 1);
        assert_eq!(body["data"]["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn list_respects_date_filters() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, budget) = insert_test_user_with_budget(&connection, "foo@bar.baz");
        let category = create_category(budget.id, "Food", "#FF0000", "🍔", &connection).unwrap();

        for day in [1u8, 15, 28] {
            create_transaction(
                NewTransaction {
                    user_id: user.id,
                    budget_id: budget.id,
                    amount: -100,
                    description: "meal".to_owned(),
                    category_id: category.id,
                    date: time::Date::from_calendar_date(2024, time::Month::August, day).unwrap(),
                },
                &connection,
            )
            .unwrap();
        }

        let server = get_test_server(connection, user.id);
        let response = server
            .get("/api/transactions")
            .add_query_param("start_date", "2024-08-10")
            .add_query_param("end_date", "2024-08-20")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["data"][0]["date"], "2024-08-15");
    }
}
