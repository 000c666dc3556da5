//! The account table: bank accounts, cards, and cash tracked by a budget.

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

/// The kind of financial account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Cash,
    Investment,
    Other,
}

impl AccountKind {
    /// The string stored in the database for this account kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::CreditCard => "credit_card",
            Self::Cash => "cash",
            Self::Investment => "investment",
            Self::Other => "other",
        }
    }

    /// Parse an account kind from client input or the database.
    ///
    /// # Errors
    /// Returns [Error::InvalidAccountKind] if `value` is not a supported kind.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit_card" => Ok(Self::CreditCard),
            "cash" => Ok(Self::Cash),
            "investment" => Ok(Self::Investment),
            "other" => Ok(Self::Other),
            _ => Err(Error::InvalidAccountKind),
        }
    }
}

/// A financial account belonging to a budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The id for the account.
    pub id: DatabaseId,
    /// The budget the account belongs to.
    pub budget_id: DatabaseId,
    /// The display name of the account.
    pub name: String,
    /// The kind of account.
    #[serde(rename = "type")]
    pub kind: AccountKind,
    /// The balance in cents.
    pub balance: i64,
    /// The ISO 4217 currency code, e.g. "USD".
    pub currency: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Free-form notes about the account.
    pub notes: String,
}

/// The fields needed to insert a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub budget_id: DatabaseId,
    pub name: String,
    pub kind: AccountKind,
    pub balance: i64,
    pub currency: String,
    pub notes: String,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            budget_id INTEGER NOT NULL REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            balance INTEGER NOT NULL DEFAULT 0,
            currency TEXT NOT NULL DEFAULT 'USD',
            is_active INTEGER NOT NULL DEFAULT 1,
            notes TEXT NOT NULL DEFAULT ''
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    let raw_kind: String = row.get(3)?;

    Ok(Account {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        name: row.get(2)?,
        kind: AccountKind::parse(&raw_kind).unwrap_or(AccountKind::Other),
        balance: row.get(4)?,
        currency: row.get(5)?,
        is_active: row.get(6)?,
        notes: row.get(7)?,
    })
}

const ACCOUNT_COLUMNS: &str = "id, budget_id, name, kind, balance, currency, is_active, notes";

/// Create a new account in the database.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn create_account(new_account: NewAccount, connection: &Connection) -> Result<Account, Error> {
    connection.execute(
        "INSERT INTO account (budget_id, name, kind, balance, currency, is_active, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
        params![
            new_account.budget_id,
            new_account.name,
            new_account.kind.as_str(),
            new_account.balance,
            new_account.currency,
            new_account.notes
        ],
    )?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        budget_id: new_account.budget_id,
        name: new_account.name,
        kind: new_account.kind,
        balance: new_account.balance,
        currency: new_account.currency,
        is_active: true,
        notes: new_account.notes,
    })
}

/// Get the accounts belonging to `budget_id`, most recently created first.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_accounts_by_budget(
    budget_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE budget_id = ?1 ORDER BY id DESC"
        ))?
        .query_map(params![budget_id], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::SqlError))
        .collect()
}

/// Get the account `account_id` and check it belongs to `budget_id`.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if `account_id` does not refer to an account.
/// - [Error::AccessDenied] if the account belongs to a different budget, or
///   the caller has no budget.
/// - [Error::SqlError] for other SQL errors.
pub fn get_account_for_budget(
    account_id: DatabaseId,
    budget_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = connection.query_one(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = ?1"),
        params![account_id],
        map_row_to_account,
    )?;

    if budget_id != Some(account.budget_id) {
        return Err(Error::AccessDenied);
    }

    Ok(account)
}

/// Overwrite the stored fields of `account`.
///
/// # Errors
/// Returns [Error::NotFound] if the account no longer exists, or
/// [Error::SqlError] for other SQL errors.
pub fn update_account(account: &Account, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE account SET name = ?1, kind = ?2, balance = ?3, currency = ?4,
            is_active = ?5, notes = ?6 WHERE id = ?7",
        params![
            account.name,
            account.kind.as_str(),
            account.balance,
            account.currency,
            account.is_active,
            account.notes,
            account.id
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the account `account_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the account does not exist, or
/// [Error::SqlError] for other SQL errors.
pub fn delete_account(account_id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM account WHERE id = ?1", params![account_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod account_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize, test_utils::insert_test_user_with_budget};

    use super::{
        AccountKind, NewAccount, create_account, delete_account, get_account_for_budget,
        get_accounts_by_budget, update_account,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn test_account(budget_id: i64, name: &str) -> NewAccount {
        NewAccount {
            budget_id,
            name: name.to_owned(),
            kind: AccountKind::Checking,
            balance: 123_45,
            currency: "USD".to_owned(),
            notes: String::new(),
        }
    }

    #[test]
    fn can_create_and_list_accounts() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");

        let first = create_account(test_account(budget.id, "Everyday"), &conn).unwrap();
        let second = create_account(test_account(budget.id, "Savings"), &conn).unwrap();

        let accounts = get_accounts_by_budget(budget.id, &conn).unwrap();

        // Most recently created first.
        assert_eq!(accounts, vec![second, first]);
    }

    #[test]
    fn access_check_rejects_other_budgets() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        let (_, other_budget) = insert_test_user_with_budget(&conn, "other@bar.baz");
        let account = create_account(test_account(budget.id, "Everyday"), &conn).unwrap();

        let got = get_account_for_budget(account.id, Some(budget.id), &conn).unwrap();
        assert_eq!(got, account);

        assert_eq!(
            get_account_for_budget(account.id, Some(other_budget.id), &conn),
            Err(Error::AccessDenied)
        );
        assert_eq!(
            get_account_for_budget(account.id, None, &conn),
            Err(Error::AccessDenied)
        );
    }

    #[test]
    fn access_check_reports_missing_account() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");

        assert_eq!(
            get_account_for_budget(1337, Some(budget.id), &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_overwrites_fields() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        let mut account = create_account(test_account(budget.id, "Everyday"), &conn).unwrap();

        account.balance = -50_00;
        account.kind = AccountKind::CreditCard;
        account.is_active = false;
        update_account(&account, &conn).unwrap();

        let got = get_account_for_budget(account.id, Some(budget.id), &conn).unwrap();
        assert_eq!(got, account);
    }

    #[test]
    fn delete_removes_the_account() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        let account = create_account(test_account(budget.id, "Everyday"), &conn).unwrap();

        delete_account(account.id, &conn).unwrap();

        assert_eq!(
            get_account_for_budget(account.id, Some(budget.id), &conn),
            Err(Error::NotFound)
        );
        assert_eq!(delete_account(account.id, &conn), Err(Error::NotFound));
    }
}
