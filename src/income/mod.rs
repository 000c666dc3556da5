//! Expected recurring income.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    ExpectedIncome, IncomeFrequency, NewExpectedIncome, create_expected_income,
    create_expected_income_table, get_expected_income_by_budget, get_expected_income_by_id,
};
pub use create_endpoint::create_expected_income_endpoint;
pub use delete_endpoint::delete_expected_income_endpoint;
pub use edit_endpoint::edit_expected_income_endpoint;
pub use list_endpoint::list_expected_income_endpoint;
