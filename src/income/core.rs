//! The expected income table: recurring income a budget plans around.

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::DatabaseId};

/// How often an expected income arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Custom,
}

impl IncomeFrequency {
    /// The string stored in the database for this frequency.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Custom => "custom",
        }
    }

    /// Parse a frequency stored in the database, falling back to monthly
    /// for unrecognized values.
    pub fn from_db_value(value: &str) -> Self {
        match value {
            "weekly" => Self::Weekly,
            "biweekly" => Self::Biweekly,
            "custom" => Self::Custom,
            _ => Self::Monthly,
        }
    }
}

/// An expected income entry for a budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedIncome {
    /// The id for the expected income.
    pub id: DatabaseId,
    /// The budget the income belongs to.
    pub budget_id: DatabaseId,
    /// What the income is, e.g. "Salary".
    pub name: String,
    /// The amount in cents.
    pub amount: i64,
    /// How often the income arrives.
    pub frequency: IncomeFrequency,
    /// The next date the income is expected.
    pub next_date: Date,
    /// Whether the income is still expected.
    pub is_active: bool,
}

/// The fields needed to insert a new expected income.
#[derive(Debug, Clone)]
pub struct NewExpectedIncome {
    pub budget_id: DatabaseId,
    pub name: String,
    pub amount: i64,
    pub frequency: IncomeFrequency,
    pub next_date: Date,
}

pub fn create_expected_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expected_income (
            id INTEGER PRIMARY KEY,
            budget_id INTEGER NOT NULL REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
            name TEXT NOT NULL,
            amount INTEGER NOT NULL,
            frequency TEXT NOT NULL,
            next_date TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_expected_income(row: &rusqlite::Row) -> Result<ExpectedIncome, rusqlite::Error> {
    let raw_frequency: String = row.get(4)?;

    Ok(ExpectedIncome {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        frequency: IncomeFrequency::from_db_value(&raw_frequency),
        next_date: row.get(5)?,
        is_active: row.get(6)?,
    })
}

/// Create a new expected income in the database.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn create_expected_income(
    new_income: NewExpectedIncome,
    connection: &Connection,
) -> Result<ExpectedIncome, Error> {
    connection.execute(
        "INSERT INTO expected_income (budget_id, name, amount, frequency, next_date, is_active)
        VALUES (?1, ?2, ?3, ?4, ?5, 1)",
        params![
            new_income.budget_id,
            new_income.name,
            new_income.amount,
            new_income.frequency.as_str(),
            new_income.next_date,
        ],
    )?;

    Ok(ExpectedIncome {
        id: connection.last_insert_rowid(),
        budget_id: new_income.budget_id,
        name: new_income.name,
        amount: new_income.amount,
        frequency: new_income.frequency,
        next_date: new_income.next_date,
        is_active: true,
    })
}

/// Get the expected income entries for `budget_id`, soonest first.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_expected_income_by_budget(
    budget_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<ExpectedIncome>, Error> {
    connection
        .prepare(
            "SELECT id, budget_id, name, amount, frequency, next_date, is_active
            FROM expected_income WHERE budget_id = ?1 ORDER BY next_date ASC, id ASC",
        )?
        .query_map(params![budget_id], map_row_to_expected_income)?
        .map(|income_result| income_result.map_err(Error::SqlError))
        .collect()
}

/// Get the expected income with the ID `income_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the entry does not exist, or
/// [Error::SqlError] for other SQL errors.
pub fn get_expected_income_by_id(
    income_id: DatabaseId,
    connection: &Connection,
) -> Result<ExpectedIncome, Error> {
    connection
        .query_one(
            "SELECT id, budget_id, name, amount, frequency, next_date, is_active
            FROM expected_income WHERE id = ?1",
            params![income_id],
            map_row_to_expected_income,
        )
        .map_err(|error| error.into())
}

/// Overwrite the stored fields of `income`.
///
/// # Errors
/// Returns [Error::NotFound] if the entry no longer exists, or
/// [Error::SqlError] for other SQL errors.
pub fn update_expected_income(income: &ExpectedIncome, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expected_income SET name = ?1, amount = ?2, frequency = ?3,
            next_date = ?4, is_active = ?5 WHERE id = ?6",
        params![
            income.name,
            income.amount,
            income.frequency.as_str(),
            income.next_date,
            income.is_active,
            income.id
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the expected income `income_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the entry does not exist, or
/// [Error::SqlError] for other SQL errors.
pub fn delete_expected_income(income_id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expected_income WHERE id = ?1",
        params![income_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod expected_income_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize, test_utils::insert_test_user_with_budget};

    use super::{
        IncomeFrequency, NewExpectedIncome, create_expected_income, delete_expected_income,
        get_expected_income_by_budget, get_expected_income_by_id, update_expected_income,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_and_list_sorted_by_next_date() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");

        let later = create_expected_income(
            NewExpectedIncome {
                budget_id: budget.id,
                name: "Bonus".to_owned(),
                amount: 100_000,
                frequency: IncomeFrequency::Custom,
                next_date: date!(2024 - 12 - 20),
            },
            &conn,
        )
        .unwrap();
        let sooner = create_expected_income(
            NewExpectedIncome {
                budget_id: budget.id,
                name: "Salary".to_owned(),
                amount: 500_000,
                frequency: IncomeFrequency::Monthly,
                next_date: date!(2024 - 09 - 01),
            },
            &conn,
        )
        .unwrap();

        let incomes = get_expected_income_by_budget(budget.id, &conn).unwrap();

        assert_eq!(incomes, vec![sooner, later]);
    }

    #[test]
    fn update_overwrites_fields() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        let mut income = create_expected_income(
            NewExpectedIncome {
                budget_id: budget.id,
                name: "Salary".to_owned(),
                amount: 500_000,
                frequency: IncomeFrequency::Monthly,
                next_date: date!(2024 - 09 - 01),
            },
            &conn,
        )
        .unwrap();

        income.amount = 520_000;
        income.is_active = false;
        update_expected_income(&income, &conn).unwrap();

        let got = get_expected_income_by_id(income.id, &conn).unwrap();
        assert_eq!(got, income);
    }

    #[test]
    fn delete_removes_the_entry() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        let income = create_expected_income(
            NewExpectedIncome {
                budget_id: budget.id,
                name: "Salary".to_owned(),
                amount: 500_000,
                frequency: IncomeFrequency::Monthly,
                next_date: date!(2024 - 09 - 01),
            },
            &conn,
        )
        .unwrap();

        delete_expected_income(income.id, &conn).unwrap();

        assert_eq!(
            get_expected_income_by_id(income.id, &conn),
            Err(Error::NotFound)
        );
    }
}
