//! Recording and querying transactions.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod query;

pub use core::{
    NewTransaction, Transaction, create_transaction, create_transaction_table,
    extract_merchant_name, get_transaction_by_id, map_row_to_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use query::{TransactionFilter, get_transactions_in_range, get_transactions_page};
