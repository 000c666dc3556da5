//! Financial accounts tracked by a budget.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;

pub use core::{
    Account, AccountKind, NewAccount, create_account, create_account_table,
    get_account_for_budget, get_accounts_by_budget, map_row_to_account,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use edit_endpoint::edit_account_endpoint;
pub use get_endpoint::get_account_endpoint;
pub use list_endpoint::list_accounts_endpoint;
