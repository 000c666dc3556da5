//! Monthly category budgets and their member splits.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod splits_endpoint;

pub use core::{
    AllocationType, CategoryBudget, CategoryBudgetSplit, SplitInput, create_category_budget,
    create_category_budget_split_table, create_category_budget_table, get_category_budget_by_id,
    get_category_budgets_by_budget, get_splits_for_category_budget, replace_splits,
};
pub use create_endpoint::create_category_budget_endpoint;
pub use delete_endpoint::delete_category_budget_endpoint;
pub use edit_endpoint::edit_category_budget_endpoint;
pub use list_endpoint::list_category_budgets_endpoint;
pub use splits_endpoint::{get_splits_endpoint, update_splits_endpoint};
