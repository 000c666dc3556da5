//! The transaction table and its basic operations.

use rusqlite::{Connection, params};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{Error, database_id::DatabaseId, user::UserId};

/// A financial transaction recorded against a budget.
///
/// Amounts are integer cents; expenses are negative and income positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The id for the transaction.
    pub id: DatabaseId,
    /// The user that recorded the transaction.
    pub user_id: UserId,
    /// The budget the transaction belongs to.
    pub budget_id: DatabaseId,
    /// The amount in cents. Negative for expenses.
    pub amount: i64,
    /// What the transaction was for.
    pub description: String,
    /// A normalized merchant name derived from the description.
    pub merchant_name: String,
    /// The category the transaction is filed under.
    pub category_id: DatabaseId,
    /// The date the transaction happened.
    pub date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

/// The fields needed to insert a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub budget_id: DatabaseId,
    pub amount: i64,
    pub description: String,
    pub category_id: DatabaseId,
    pub date: Date,
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            budget_id INTEGER NOT NULL REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
            amount INTEGER NOT NULL,
            description TEXT NOT NULL,
            merchant_name TEXT NOT NULL DEFAULT '',
            category_id INTEGER NOT NULL REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_transaction(row: &rusqlite::Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        budget_id: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        merchant_name: row.get(5)?,
        category_id: row.get(6)?,
        date: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, user_id, budget_id, amount, description, merchant_name, category_id, date, created_at";

/// Extract a normalized merchant name from a transaction description.
///
/// Takes the first whitespace-separated word and uppercases it, so that
/// "Starbucks on 5th" and "starbucks downtown" both map to "STARBUCKS".
pub fn extract_merchant_name(description: &str) -> String {
    description
        .split_whitespace()
        .next()
        .map(str::to_uppercase)
        .unwrap_or_default()
}

/// Create a new transaction in the database.
///
/// The merchant name is derived from the description.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let merchant_name = extract_merchant_name(&new_transaction.description);
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO \"transaction\"
            (user_id, budget_id, amount, description, merchant_name, category_id, date, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            new_transaction.user_id.as_i64(),
            new_transaction.budget_id,
            new_transaction.amount,
            new_transaction.description,
            merchant_name,
            new_transaction.category_id,
            new_transaction.date,
            created_at,
        ],
    )?;

    Ok(Transaction {
        id: connection.last_insert_rowid(),
        user_id: new_transaction.user_id,
        budget_id: new_transaction.budget_id,
        amount: new_transaction.amount,
        description: new_transaction.description,
        merchant_name,
        category_id: new_transaction.category_id,
        date: new_transaction.date,
        created_at,
    })
}

/// Get the transaction with the ID `transaction_id`.
///
/// # Errors
/// Returns [Error::NotFound] if `transaction_id` does not refer to a
/// transaction, or [Error::SqlError] for other SQL errors.
pub fn get_transaction_by_id(
    transaction_id: DatabaseId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .query_one(
            &format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1"),
            params![transaction_id],
            map_row_to_transaction,
        )
        .map_err(|error| error.into())
}

/// Overwrite the mutable fields of `transaction`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction no longer exists, or
/// [Error::SqlError] for other SQL errors.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET amount = ?1, description = ?2, merchant_name = ?3,
            category_id = ?4, date = ?5 WHERE id = ?6",
        params![
            transaction.amount,
            transaction.description,
            transaction.merchant_name,
            transaction.category_id,
            transaction.date,
            transaction.id
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the transaction `transaction_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist, or
/// [Error::SqlError] for other SQL errors.
pub fn delete_transaction(transaction_id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1",
        params![transaction_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
