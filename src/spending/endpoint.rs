//! The endpoint that answers "what can I spend?".
//!
//! Derives the current spending period from the user's preferences,
//! prorates each category's monthly budget to that period, aggregates the
//! period's actual spend per category, and reports availability and status.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    AppState, Error,
    category::{Category, get_categories_for_budget},
    category_budget::{
        AllocationType, CategoryBudget, CategoryBudgetSplit, get_category_budgets_by_budget,
        get_splits_for_category_budget,
    },
    database_id::DatabaseId,
    responses::data_response,
    spending::{
        SpendingStatus, classify_spending, current_period, days_remaining_in_period,
        percentage_used, prorate_monthly_amount,
    },
    timezone::local_date_today,
    transaction::{Transaction, get_transactions_in_range},
    user::{User, UserId, ViewPeriod, get_user_by_id},
};

/// The state needed to build the spending report.
#[derive(Debug, Clone)]
pub struct SpendingState {
    /// The database connection for reading budgets and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SpendingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The current spending period as reported to the client.
#[derive(Debug, Serialize)]
pub struct SpendingPeriod {
    /// The cadence the period was derived for.
    #[serde(rename = "type")]
    pub kind: ViewPeriod,
    pub start_date: Date,
    pub end_date: Date,
    pub days_remaining: i64,
}

/// The totals across all budgeted categories, in prorated cents.
#[derive(Debug, Serialize)]
pub struct SpendingSummary {
    pub total_available: i64,
    pub total_budgeted: i64,
    pub total_spent: i64,
}

/// One category's availability within the current period.
#[derive(Debug, Serialize)]
pub struct CategorySpending {
    pub category_id: DatabaseId,
    pub category_name: String,
    pub category_icon: String,
    pub category_color: String,
    /// The budget prorated to the view period, in cents.
    pub budgeted: i64,
    /// The actual spend within the period, in cents.
    pub spent: i64,
    /// `budgeted - spent`, in cents.
    pub available: i64,
    pub percentage_used: f64,
    pub status: SpendingStatus,
    /// Whether the budget is divided between members.
    pub is_split: bool,
    /// The requesting user's prorated share of a split budget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_allocation: Option<i64>,
    /// The requesting user's share minus their own spend in the period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_available: Option<i64>,
}

/// The full spending report.
#[derive(Debug, Serialize)]
pub struct SpendingAvailableResponse {
    pub period: SpendingPeriod,
    pub summary: SpendingSummary,
    pub categories: Vec<CategorySpending>,
}

/// A route handler that builds the spending report for the logged-in user.
///
/// Users without a budget receive an empty report over a default monthly
/// period.
pub async fn get_spending_available_endpoint(
    State(state): State<SpendingState>,
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

    let today = local_date_today(&state.local_timezone);

    let Some(budget_id) = user.budget_id else {
        return data_response(StatusCode::OK, empty_report(today));
    };

    let range = current_period(
        user.view_period,
        user.period_anchor_day,
        user.period_start_date,
        today,
    );
    let period = SpendingPeriod {
        kind: user.view_period,
        start_date: range.start,
        end_date: range.end,
        days_remaining: days_remaining_in_period(range.end, today),
    };

    let category_budgets = match get_category_budgets_by_budget(budget_id, &connection) {
        Ok(category_budgets) => category_budgets,
        Err(error) => return error.into_response(),
    };
    let categories = match get_categories_for_budget(Some(budget_id), &connection) {
        Ok(categories) => categories,
        Err(error) => return error.into_response(),
    };
    let transactions = match get_transactions_in_range(budget_id, range.start, range.end, &connection)
    {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    let categories_by_id: HashMap<DatabaseId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let mut category_spending = Vec::with_capacity(category_budgets.len());
    let mut total_budgeted = 0;
    let mut total_spent = 0;

    for category_budget in &category_budgets {
        // A budget whose category was deleted has nothing to display.
        let Some(category) = categories_by_id.get(&category_budget.category_id) else {
            continue;
        };

        let splits = if category_budget.allocation_type == AllocationType::Split {
            match get_splits_for_category_budget(category_budget.id, &connection) {
                Ok(splits) => splits,
                Err(error) => return error.into_response(),
            }
        } else {
            vec![]
        };

        let entry = build_category_spending(category_budget, category, &transactions, &splits, &user);

        total_budgeted += entry.budgeted;
        total_spent += entry.spent;
        category_spending.push(entry);
    }

    let response = SpendingAvailableResponse {
        period,
        summary: SpendingSummary {
            total_available: total_budgeted - total_spent,
            total_budgeted,
            total_spent,
        },
        categories: category_spending,
    };

    data_response(StatusCode::OK, response)
}

/// The report returned to users that are not part of any budget.
fn empty_report(today: Date) -> SpendingAvailableResponse {
    let range = current_period(ViewPeriod::Monthly, None, today, today);

    SpendingAvailableResponse {
        period: SpendingPeriod {
            kind: ViewPeriod::Monthly,
            start_date: range.start,
            end_date: range.end,
            days_remaining: days_remaining_in_period(range.end, today),
        },
        summary: SpendingSummary {
            total_available: 0,
            total_budgeted: 0,
            total_spent: 0,
        },
        categories: vec![],
    }
}

/// Build one category's report entry from the period's transactions.
fn build_category_spending(
    category_budget: &CategoryBudget,
    category: &Category,
    transactions: &[Transaction],
    splits: &[CategoryBudgetSplit],
    user: &User,
) -> CategorySpending {
    let budgeted = prorate_monthly_amount(category_budget.amount, user.view_period);
    let spent = spent_in_category(transactions, category_budget.category_id);
    let percentage = percentage_used(spent, budgeted);

    let is_split = category_budget.allocation_type != AllocationType::Pooled;
    let my_allocation = splits
        .iter()
        .find(|split| split.user_id == user.id)
        .and_then(|split| member_share(split, budgeted, user.view_period));
    let my_available = my_allocation.map(|allocation| {
        allocation - spent_by_user_in_category(transactions, category_budget.category_id, user.id)
    });

    CategorySpending {
        category_id: category.id,
        category_name: category.name.clone(),
        category_icon: category.icon.clone(),
        category_color: category.color.clone(),
        budgeted,
        spent,
        available: budgeted - spent,
        percentage_used: percentage,
        status: classify_spending(percentage),
        is_split,
        my_allocation,
        my_available,
    }
}

/// Sum the absolute value of the period's expenses in one category.
///
/// Only negative amounts count as spending; income within the category does
/// not offset it.
fn spent_in_category(transactions: &[Transaction], category_id: DatabaseId) -> i64 {
    transactions
        .iter()
        .filter(|transaction| transaction.category_id == category_id && transaction.amount < 0)
        .map(|transaction| transaction.amount.abs())
        .sum()
}

/// Sum one member's expenses in one category.
fn spent_by_user_in_category(
    transactions: &[Transaction],
    category_id: DatabaseId,
    user_id: UserId,
) -> i64 {
    transactions
        .iter()
        .filter(|transaction| {
            transaction.category_id == category_id
                && transaction.user_id == user_id
                && transaction.amount < 0
        })
        .map(|transaction| transaction.amount.abs())
        .sum()
}

/// A member's prorated share of a split budget.
///
/// Fixed amounts are stored monthly and prorated like the budget itself;
/// percentages apply to the already-prorated budgeted amount.
fn member_share(
    split: &CategoryBudgetSplit,
    prorated_budgeted: i64,
    view_period: ViewPeriod,
) -> Option<i64> {
    if let Some(amount) = split.allocation_amount {
        return Some(prorate_monthly_amount(amount, view_period));
    }

    split
        .allocation_percentage
        .map(|percentage| ((prorated_budgeted as f64) * percentage / 100.0).round() as i64)
}
