//! Expense and income categories.

mod core;
mod create_endpoint;
mod list_endpoint;

pub use core::{
    Category, create_category, create_category_table, get_categories_for_budget, get_category_by_id,
    map_row_to_category, seed_system_categories,
};
pub use create_endpoint::create_category_endpoint;
pub use list_endpoint::list_categories_endpoint;
