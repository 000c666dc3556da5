//! The category budget tables: monthly amounts per category, optionally
//! split between budget members.

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId, user::UserId};

/// How a category budget is shared between budget members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationType {
    /// The whole amount is shared by all members.
    Pooled,
    /// The amount is divided between members by fixed amounts or percentages.
    Split,
}

impl AllocationType {
    /// The string stored in the database for this allocation type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pooled => "pooled",
            Self::Split => "split",
        }
    }

    /// Parse an allocation type stored in the database, falling back to
    /// pooled for unrecognized values.
    pub fn from_db_value(value: &str) -> Self {
        match value {
            "split" => Self::Split,
            _ => Self::Pooled,
        }
    }
}

/// A monthly budget for one category.
///
/// The amount is always the canonical monthly amount in cents; prorated
/// amounts are derived at read time and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBudget {
    /// The id for the category budget.
    pub id: DatabaseId,
    /// The budget (household) this category budget belongs to.
    pub budget_id: DatabaseId,
    /// The category the amount applies to.
    pub category_id: DatabaseId,
    /// The monthly amount in cents. Never negative.
    pub amount: i64,
    /// How the amount is shared between members.
    pub allocation_type: AllocationType,
}

/// One member's share of a split category budget.
///
/// Exactly one of `allocation_percentage` and `allocation_amount` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBudgetSplit {
    /// The id for the split.
    pub id: DatabaseId,
    /// The category budget the split belongs to.
    pub category_budget_id: DatabaseId,
    /// The member the share is allocated to.
    pub user_id: UserId,
    /// The share as a percentage of the budgeted amount, e.g. 60.0.
    pub allocation_percentage: Option<f64>,
    /// The share as a fixed monthly amount in cents.
    pub allocation_amount: Option<i64>,
}

/// A member's share as sent by the client when replacing splits.
#[derive(Debug, Clone, Deserialize)]
pub struct SplitInput {
    pub user_id: i64,
    pub allocation_percentage: Option<f64>,
    pub allocation_amount: Option<i64>,
}

pub fn create_category_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category_budget (
            id INTEGER PRIMARY KEY,
            budget_id INTEGER NOT NULL REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
            category_id INTEGER NOT NULL REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
            amount INTEGER NOT NULL,
            allocation_type TEXT NOT NULL DEFAULT 'pooled'
        )",
        (),
    )?;

    Ok(())
}

pub fn create_category_budget_split_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category_budget_split (
            id INTEGER PRIMARY KEY,
            category_budget_id INTEGER NOT NULL
                REFERENCES category_budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            allocation_percentage REAL,
            allocation_amount INTEGER
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_category_budget(row: &rusqlite::Row) -> Result<CategoryBudget, rusqlite::Error> {
    let raw_allocation_type: String = row.get(4)?;

    Ok(CategoryBudget {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        category_id: row.get(2)?,
        amount: row.get(3)?,
        allocation_type: AllocationType::from_db_value(&raw_allocation_type),
    })
}

pub fn map_row_to_split(row: &rusqlite::Row) -> Result<CategoryBudgetSplit, rusqlite::Error> {
    Ok(CategoryBudgetSplit {
        id: row.get(0)?,
        category_budget_id: row.get(1)?,
        user_id: UserId::new(row.get(2)?),
        allocation_percentage: row.get(3)?,
        allocation_amount: row.get(4)?,
    })
}

/// Create a monthly budget for a category.
///
/// # Errors
/// Returns [Error::NegativeBudgetAmount] if `amount` is negative, or
/// [Error::SqlError] for SQL errors.
pub fn create_category_budget(
    budget_id: DatabaseId,
    category_id: DatabaseId,
    amount: i64,
    allocation_type: AllocationType,
    connection: &Connection,
) -> Result<CategoryBudget, Error> {
    if amount < 0 {
        return Err(Error::NegativeBudgetAmount);
    }

    connection.execute(
        "INSERT INTO category_budget (budget_id, category_id, amount, allocation_type)
        VALUES (?1, ?2, ?3, ?4)",
        params![budget_id, category_id, amount, allocation_type.as_str()],
    )?;

    Ok(CategoryBudget {
        id: connection.last_insert_rowid(),
        budget_id,
        category_id,
        amount,
        allocation_type,
    })
}

/// Get the category budgets belonging to `budget_id`.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_category_budgets_by_budget(
    budget_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<CategoryBudget>, Error> {
    connection
        .prepare(
            "SELECT id, budget_id, category_id, amount, allocation_type
            FROM category_budget WHERE budget_id = ?1 ORDER BY id ASC",
        )?
        .query_map(params![budget_id], map_row_to_category_budget)?
        .map(|budget_result| budget_result.map_err(Error::SqlError))
        .collect()
}

/// Get the category budget with the ID `category_budget_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the category budget does not exist, or
/// [Error::SqlError] for other SQL errors.
pub fn get_category_budget_by_id(
    category_budget_id: DatabaseId,
    connection: &Connection,
) -> Result<CategoryBudget, Error> {
    connection
        .query_one(
            "SELECT id, budget_id, category_id, amount, allocation_type
            FROM category_budget WHERE id = ?1",
            params![category_budget_id],
            map_row_to_category_budget,
        )
        .map_err(|error| error.into())
}

/// Overwrite the amount and allocation type of `category_budget`.
///
/// # Errors
/// Returns:
/// - [Error::NegativeBudgetAmount] if the amount is negative.
/// - [Error::NotFound] if the category budget no longer exists.
/// - [Error::SqlError] for other SQL errors.
pub fn update_category_budget(
    category_budget: &CategoryBudget,
    connection: &Connection,
) -> Result<(), Error> {
    if category_budget.amount < 0 {
        return Err(Error::NegativeBudgetAmount);
    }

    let rows_affected = connection.execute(
        "UPDATE category_budget SET amount = ?1, allocation_type = ?2 WHERE id = ?3",
        params![
            category_budget.amount,
            category_budget.allocation_type.as_str(),
            category_budget.id
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the category budget `category_budget_id` along with its splits.
///
/// # Errors
/// Returns [Error::NotFound] if the category budget does not exist, or
/// [Error::SqlError] for other SQL errors.
pub fn delete_category_budget(
    category_budget_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM category_budget_split WHERE category_budget_id = ?1",
        params![category_budget_id],
    )?;

    let rows_affected = connection.execute(
        "DELETE FROM category_budget WHERE id = ?1",
        params![category_budget_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the splits of the category budget `category_budget_id`.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_splits_for_category_budget(
    category_budget_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<CategoryBudgetSplit>, Error> {
    connection
        .prepare(
            "SELECT id, category_budget_id, user_id, allocation_percentage, allocation_amount
            FROM category_budget_split WHERE category_budget_id = ?1 ORDER BY id ASC",
        )?
        .query_map(params![category_budget_id], map_row_to_split)?
        .map(|split_result| split_result.map_err(Error::SqlError))
        .collect()
}

/// Replace the splits of a category budget and mark it as split.
///
/// Every split user must be a member of `budget_id`, and each split must
/// name exactly one of a fixed amount or a percentage. All changes happen
/// in one SQL transaction.
///
/// # Errors
/// Returns:
/// - [Error::InvalidAllocation] if a split names neither or both of amount
///   and percentage, or a percentage outside 0-100.
/// - [Error::SplitUserOutsideBudget] if a split user is not a member of the
///   budget.
/// - [Error::SqlError] for SQL errors.
pub fn replace_splits(
    category_budget_id: DatabaseId,
    budget_id: DatabaseId,
    splits: &[SplitInput],
    connection: &Connection,
) -> Result<Vec<CategoryBudgetSplit>, Error> {
    for split in splits {
        validate_split(split)?;

        let is_member: bool = connection.query_one(
            "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1 AND budget_id = ?2)",
            params![split.user_id, budget_id],
            |row| row.get(0),
        )?;

        if !is_member {
            return Err(Error::SplitUserOutsideBudget);
        }
    }

    let sql_transaction = connection.unchecked_transaction()?;

    sql_transaction.execute(
        "DELETE FROM category_budget_split WHERE category_budget_id = ?1",
        params![category_budget_id],
    )?;

    let mut inserted = Vec::with_capacity(splits.len());
    for split in splits {
        sql_transaction.execute(
            "INSERT INTO category_budget_split
                (category_budget_id, user_id, allocation_percentage, allocation_amount)
            VALUES (?1, ?2, ?3, ?4)",
            params![
                category_budget_id,
                split.user_id,
                split.allocation_percentage,
                split.allocation_amount
            ],
        )?;

        inserted.push(CategoryBudgetSplit {
            id: sql_transaction.last_insert_rowid(),
            category_budget_id,
            user_id: UserId::new(split.user_id),
            allocation_percentage: split.allocation_percentage,
            allocation_amount: split.allocation_amount,
        });
    }

    sql_transaction.execute(
        "UPDATE category_budget SET allocation_type = 'split' WHERE id = ?1",
        params![category_budget_id],
    )?;

    sql_transaction.commit()?;

    Ok(inserted)
}

fn validate_split(split: &SplitInput) -> Result<(), Error> {
    match (split.allocation_amount, split.allocation_percentage) {
        (Some(_), Some(_)) | (None, None) => Err(Error::InvalidAllocation),
        (Some(amount), None) if amount < 0 => Err(Error::InvalidAllocation),
        (None, Some(percentage)) if !(0.0..=100.0).contains(&percentage) => {
            Err(Error::InvalidAllocation)
        }
        _ => Ok(()),
    }
}
