//! Creating the application's database schema.

use rusqlite::Connection;

use crate::{
    Error, account::create_account_table, budget::create_budget_table,
    category::{create_category_table, seed_system_categories},
    category_budget::{create_category_budget_split_table, create_category_budget_table},
    income::create_expected_income_table, invitation::create_invitation_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the tables for the domain models and seed the system categories.
///
/// Safe to call on an existing database: tables are only created when
/// missing, and seeding skips categories that already exist.
///
/// # Errors
/// Returns an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let sql_transaction = connection.unchecked_transaction()?;

    create_user_table(&sql_transaction)?;
    create_budget_table(&sql_transaction)?;
    create_category_table(&sql_transaction)?;
    create_account_table(&sql_transaction)?;
    create_transaction_table(&sql_transaction)?;
    create_category_budget_table(&sql_transaction)?;
    create_category_budget_split_table(&sql_transaction)?;
    create_expected_income_table(&sql_transaction)?;
    create_invitation_table(&sql_transaction)?;
    seed_system_categories(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}
