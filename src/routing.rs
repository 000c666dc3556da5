//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_account_endpoint, list_accounts_endpoint,
    },
    auth::{auth_guard, log_in_endpoint, log_out_endpoint},
    budget::get_budget_members_endpoint,
    category::{create_category_endpoint, list_categories_endpoint},
    category_budget::{
        create_category_budget_endpoint, delete_category_budget_endpoint,
        edit_category_budget_endpoint, get_splits_endpoint, list_category_budgets_endpoint,
        update_splits_endpoint,
    },
    endpoints,
    income::{
        create_expected_income_endpoint, delete_expected_income_endpoint,
        edit_expected_income_endpoint, list_expected_income_endpoint,
    },
    invitation::{
        accept_invitation_endpoint, decline_invitation_endpoint, invite_to_budget_endpoint,
        list_invitations_endpoint,
    },
    logging::logging_middleware,
    responses::error_body,
    spending::get_spending_available_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, list_transactions_endpoint,
    },
    user::{get_current_user_endpoint, register_user_endpoint, update_user_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::USERS, post(register_user_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::LOG_OUT, post(log_out_endpoint));

    let protected_routes = Router::new()
        .route(
            endpoints::ME,
            get(get_current_user_endpoint).patch(update_user_endpoint),
        )
        .route(
            endpoints::SPENDING_AVAILABLE,
            get(get_spending_available_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::ACCOUNTS,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint)
                .put(edit_account_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::CATEGORY_BUDGETS,
            get(list_category_budgets_endpoint).post(create_category_budget_endpoint),
        )
        .route(
            endpoints::CATEGORY_BUDGET,
            put(edit_category_budget_endpoint).delete(delete_category_budget_endpoint),
        )
        .route(
            endpoints::CATEGORY_BUDGET_SPLITS,
            get(get_splits_endpoint).put(update_splits_endpoint),
        )
        .route(endpoints::BUDGET_MEMBERS, get(get_budget_members_endpoint))
        .route(
            endpoints::EXPECTED_INCOME,
            get(list_expected_income_endpoint).post(create_expected_income_endpoint),
        )
        .route(
            endpoints::EXPECTED_INCOME_ENTRY,
            put(edit_expected_income_endpoint).delete(delete_expected_income_endpoint),
        )
        .route(endpoints::BUDGET_INVITE, post(invite_to_budget_endpoint))
        .route(
            endpoints::BUDGET_INVITATIONS,
            get(list_invitations_endpoint),
        )
        .route(
            endpoints::ACCEPT_INVITATION,
            post(accept_invitation_endpoint),
        )
        .route(
            endpoints::DECLINE_INVITATION,
            post(decline_invitation_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .layer(middleware::from_fn(logging_middleware))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The liveness probe used by deployment tooling.
async fn get_health() -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" }))).into_response()
}

/// The JSON 404 returned for unknown routes.
async fn get_404_not_found() -> Response {
    error_body(StatusCode::NOT_FOUND, "the requested resource could not be found")
}

#[cfg(test)]
mod routing_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, pagination::PaginationConfig};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "42",
            "Etc/UTC",
            PaginationConfig::default(),
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn health_is_public() {
        let server = get_test_server();

        let response = server.get("/health").await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn api_routes_require_authentication() {
        let server = get_test_server();

        for path in [
            "/api/auth/me",
            "/api/spending/available",
            "/api/categories",
            "/api/accounts",
            "/api/transactions",
            "/api/category-budgets",
            "/api/budget/members",
            "/api/expected-income",
            "/api/budget-invitations",
        ] {
            let response = server.get(path).await;

            response.assert_status_unauthorized();
            response.assert_json(&serde_json::json!({ "error": "unauthorized" }));
        }
    }

    #[tokio::test]
    async fn unknown_routes_return_json_404() {
        let server = get_test_server();

        let response = server.get("/api/definitely-not-a-route").await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn register_then_use_the_api_end_to_end() {
        let server = get_test_server();

        let response = server
            .post("/api/users")
            .json(&serde_json::json!({
                "email": "foo@bar.baz",
                "password": "averystrongandlongpassword",
                "name": "Foo",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let cookies = response.cookies();

        // The session cookie from registration authenticates follow-up calls.
        let response = server.get("/api/auth/me").add_cookies(cookies.clone()).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["email"], "foo@bar.baz");

        let response = server
            .get("/api/spending/available")
            .add_cookies(cookies)
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["summary"]["total_budgeted"], 0);
    }
}
