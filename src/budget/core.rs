//! The budget table: the shared household unit that users belong to.

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseId, user::UserId};

/// The default maximum number of members a budget can have.
const DEFAULT_MAX_MEMBERS: u32 = 5;

/// A member's role within a shared budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetRole {
    /// The user that created the budget.
    Owner,
    /// A member that can view and modify the budget's data.
    ReadWrite,
    /// A member that can only view the budget's data.
    ReadOnly,
}

impl BudgetRole {
    /// The string stored in the database for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::ReadWrite => "read_write",
            Self::ReadOnly => "read_only",
        }
    }

    /// Parse a role stored in the database, falling back to read-write for
    /// unrecognized values.
    pub fn from_db_value(value: &str) -> Self {
        match value {
            "owner" => Self::Owner,
            "read_only" => Self::ReadOnly,
            _ => Self::ReadWrite,
        }
    }

    /// Parse a role that may be granted through an invitation.
    ///
    /// Only `read_only` and `read_write` can be granted; ownership is never
    /// transferable by invitation. An empty string selects the default
    /// read-write role.
    ///
    /// # Errors
    /// Returns [Error::InvalidRole] for any other value.
    pub fn parse_invited(value: &str) -> Result<Self, Error> {
        match value {
            "" | "read_write" => Ok(Self::ReadWrite),
            "read_only" => Ok(Self::ReadOnly),
            _ => Err(Error::InvalidRole),
        }
    }
}

/// A budget shared by one or more users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The id for the budget.
    pub id: DatabaseId,
    /// The display name of the budget.
    pub name: String,
    /// The user that created the budget.
    pub created_by: UserId,
    /// The maximum number of members the budget can have.
    pub max_members: u32,
    /// Whether the budget is active.
    pub is_active: bool,
    /// When the budget was created.
    pub created_at: OffsetDateTime,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            created_by INTEGER NOT NULL REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            max_members INTEGER NOT NULL DEFAULT 5,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_budget(row: &rusqlite::Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        name: row.get(1)?,
        created_by: UserId::new(row.get(2)?),
        max_members: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Create a budget named `name` owned by `created_by`.
///
/// The creator is not added as a member here; update the user row once the
/// budget exists (the user table references this table, not the reverse).
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn create_budget(
    name: &str,
    created_by: UserId,
    connection: &Connection,
) -> Result<Budget, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO budget (name, created_by, max_members, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, created_by.as_i64(), DEFAULT_MAX_MEMBERS, created_at],
    )?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
        created_by,
        max_members: DEFAULT_MAX_MEMBERS,
        is_active: true,
        created_at,
    })
}

/// Get the budget with the ID `budget_id`.
///
/// # Errors
/// Returns [Error::NotFound] if `budget_id` does not refer to a budget, or
/// [Error::SqlError] for other SQL errors.
pub fn get_budget_by_id(budget_id: DatabaseId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .query_one(
            "SELECT id, name, created_by, max_members, is_active, created_at
            FROM budget WHERE id = ?1",
            params![budget_id],
            map_row_to_budget,
        )
        .map_err(|error| error.into())
}


#[cfg(test)]
mod budget_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        password::PasswordHash,
        user::{UserId, create_user},
    };

    use super::{create_budget, get_budget_by_id};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_test_user(conn: &Connection) -> UserId {
        create_user(
            crate::user::NewUser {
                email: "foo@bar.baz".to_owned(),
                name: "Test User".to_owned(),
                password_hash: PasswordHash::new_unchecked("hunter2"),
                period_start_date: date!(2024 - 01 - 01),
            },
            conn,
        )
        .unwrap()
        .id
    }

    #[test]
    fn insert_budget_succeeds() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn);

        let budget = create_budget("My Budget", user_id, &conn).unwrap();

        assert!(budget.id > 0);
        assert_eq!(budget.name, "My Budget");
        assert_eq!(budget.created_by, user_id);
        assert!(budget.is_active);
    }

    #[test]
    fn get_budget_round_trips() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn);
        let inserted = create_budget("My Budget", user_id, &conn).unwrap();

        let got = get_budget_by_id(inserted.id, &conn).unwrap();

        assert_eq!(got, inserted);
    }

    #[test]
    fn get_budget_fails_with_invalid_id() {
        let conn = get_test_connection();

        assert_eq!(get_budget_by_id(1337, &conn), Err(Error::NotFound));
    }
}
