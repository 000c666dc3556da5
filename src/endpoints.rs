//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/accounts/{account_id}',
//! use [format_endpoint].

/// The liveness probe.
pub const HEALTH: &str = "/health";

/// The route for registering a user.
pub const USERS: &str = "/api/users";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for reading and updating the current user.
pub const ME: &str = "/api/auth/me";

/// The route for the spending report.
pub const SPENDING_AVAILABLE: &str = "/api/spending/available";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";

/// The route to list and create accounts.
pub const ACCOUNTS: &str = "/api/accounts";
/// The route to access a single account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// The route to list and create category budgets.
pub const CATEGORY_BUDGETS: &str = "/api/category-budgets";
/// The route to access a single category budget.
pub const CATEGORY_BUDGET: &str = "/api/category-budgets/{category_budget_id}";
/// The route to read and replace a category budget's member splits.
pub const CATEGORY_BUDGET_SPLITS: &str = "/api/category-budgets/{category_budget_id}/splits";

/// The route to list the members of the current user's budget.
pub const BUDGET_MEMBERS: &str = "/api/budget/members";

/// The route to list and create expected income.
pub const EXPECTED_INCOME: &str = "/api/expected-income";
/// The route to access a single expected income entry.
pub const EXPECTED_INCOME_ENTRY: &str = "/api/expected-income/{income_id}";

/// The route to invite someone to a budget.
pub const BUDGET_INVITE: &str = "/api/budgets/{budget_id}/invite";
/// The route to list the current user's pending invitations.
pub const BUDGET_INVITATIONS: &str = "/api/budget-invitations";
/// The route to accept an invitation.
pub const ACCEPT_INVITATION: &str = "/api/budget-invitations/{token}/accept";
/// The route to decline an invitation.
pub const DECLINE_INVITATION: &str = "/api/budget-invitations/{token}/decline";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/accounts/{account_id}',
/// '{account_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::HEALTH);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::ME);
        assert_endpoint_is_valid_uri(endpoints::SPENDING_AVAILABLE);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNTS);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNT);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_BUDGETS);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_BUDGET);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_BUDGET_SPLITS);
        assert_endpoint_is_valid_uri(endpoints::BUDGET_MEMBERS);
        assert_endpoint_is_valid_uri(endpoints::EXPECTED_INCOME);
        assert_endpoint_is_valid_uri(endpoints::EXPECTED_INCOME_ENTRY);
        assert_endpoint_is_valid_uri(endpoints::BUDGET_INVITE);
        assert_endpoint_is_valid_uri(endpoints::BUDGET_INVITATIONS);
        assert_endpoint_is_valid_uri(endpoints::ACCEPT_INVITATION);
        assert_endpoint_is_valid_uri(endpoints::DECLINE_INVITATION);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
