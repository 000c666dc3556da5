//! The user table and the user's budgeting preferences.

use std::fmt::Display;

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, budget::BudgetRole, database_id::DatabaseId, password::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The cadence at which a user views their budgets.
///
/// Budgets always store monthly amounts; the view period only controls how
/// amounts are prorated and how the current spending period is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPeriod {
    Weekly,
    Biweekly,
    Monthly,
}

impl ViewPeriod {
    /// The string stored in the database for this view period.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }

    /// Parse a view period stored in the database.
    ///
    /// Unrecognized values fall back to the monthly view rather than
    /// erroring, so a bad row can never take down the spending report.
    pub fn from_db_value(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::Monthly)
    }

    /// Parse a view period from client input.
    ///
    /// # Errors
    /// Returns [Error::InvalidViewPeriod] if `value` is not one of
    /// `weekly`, `biweekly`, or `monthly`.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(Error::InvalidViewPeriod),
        }
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The email the user registered and logs in with.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The user's password hash. Never serialized into API responses.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// The budget (household) the user belongs to, if any.
    pub budget_id: Option<DatabaseId>,
    /// The user's role within their budget.
    pub budget_role: BudgetRole,
    /// The cadence at which the user views their budgets.
    pub view_period: ViewPeriod,
    /// The reference date that fixes the alignment of spending periods.
    pub period_start_date: Date,
    /// The day the user's spending period starts on: a day-of-month (1-28)
    /// for monthly periods, a day-of-week (0=Sunday..6=Saturday) otherwise.
    pub period_anchor_day: Option<u8>,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

/// The fields needed to insert a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: PasswordHash,
    /// The reference date for spending periods, normally the registration date.
    pub period_start_date: Date,
}

/// Create the user table.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password TEXT NOT NULL,
            budget_id INTEGER REFERENCES budget(id) ON UPDATE CASCADE ON DELETE SET NULL,
            budget_role TEXT NOT NULL DEFAULT 'read_write',
            view_period TEXT NOT NULL DEFAULT 'monthly',
            period_start_date TEXT NOT NULL,
            period_anchor_day INTEGER,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let raw_password: String = row.get(3)?;
    let raw_role: String = row.get(5)?;
    let raw_view_period: String = row.get(6)?;

    Ok(User {
        id: UserId::new(row.get(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password),
        budget_id: row.get(4)?,
        budget_role: BudgetRole::from_db_value(&raw_role),
        view_period: ViewPeriod::from_db_value(&raw_view_period),
        period_start_date: row.get(7)?,
        period_anchor_day: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const USER_COLUMNS: &str = "id, email, name, password, budget_id, budget_role, \
    view_period, period_start_date, period_anchor_day, created_at";

/// Create and insert a new user into the database.
///
/// New users start without a budget; callers normally follow up with
/// [set_user_budget] once their personal budget row exists.
///
/// # Errors
/// Returns [Error::DuplicateEmail] if a user with the same email exists, or
/// [Error::SqlError] for other SQL errors.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO user (email, name, password, view_period, period_start_date, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new_user.email,
            new_user.name,
            new_user.password_hash.to_string(),
            ViewPeriod::Monthly.as_str(),
            new_user.period_start_date,
            created_at,
        ],
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: new_user.email,
        name: new_user.name,
        password_hash: new_user.password_hash,
        budget_id: None,
        budget_role: BudgetRole::ReadWrite,
        view_period: ViewPeriod::Monthly,
        period_start_date: new_user.period_start_date,
        period_anchor_day: None,
        created_at,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if `user_id` does not belong to a registered
/// user, or [Error::SqlError] for other SQL errors.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .query_one(
            &format!("SELECT {USER_COLUMNS} FROM user WHERE id = ?1"),
            params![user_id.as_i64()],
            map_row_to_user,
        )
        .map_err(|error| error.into())
}

/// Get the user from the database with an email equal to `email`.
///
/// # Errors
/// Returns [Error::NotFound] if no user registered with `email`, or
/// [Error::SqlError] for other SQL errors.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .query_one(
            &format!("SELECT {USER_COLUMNS} FROM user WHERE email = ?1"),
            params![email],
            map_row_to_user,
        )
        .map_err(|error| error.into())
}

/// Get all users that are members of the budget `budget_id`.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_users_by_budget(
    budget_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<User>, Error> {
    connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS} FROM user WHERE budget_id = ?1 ORDER BY id ASC"
        ))?
        .query_map(params![budget_id], map_row_to_user)?
        .map(|user_result| user_result.map_err(Error::SqlError))
        .collect()
}

/// Set the budget and role for the user `user_id`.
///
/// Pass `None` to remove the user from their budget.
///
/// # Errors
/// Returns [Error::NotFound] if `user_id` does not belong to a registered
/// user, or [Error::SqlError] for other SQL errors.
pub fn set_user_budget(
    user_id: UserId,
    budget_id: Option<DatabaseId>,
    role: BudgetRole,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET budget_id = ?1, budget_role = ?2 WHERE id = ?3",
        params![budget_id, role.as_str(), user_id.as_i64()],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The subset of user settings that can be changed through the API.
#[derive(Debug, Default, Clone)]
pub struct UserSettingsUpdate {
    pub name: Option<String>,
    pub view_period: Option<ViewPeriod>,
    pub period_anchor_day: Option<u8>,
}

/// Apply `changes` to the user `user_id` and return the updated user.
///
/// # Errors
/// Returns [Error::NotFound] if `user_id` does not belong to a registered
/// user, or [Error::SqlError] for other SQL errors.
pub fn update_user_settings(
    user_id: UserId,
    changes: &UserSettingsUpdate,
    connection: &Connection,
) -> Result<User, Error> {
    let mut user = get_user_by_id(user_id, connection)?;

    if let Some(name) = &changes.name {
        user.name = name.clone();
    }
    if let Some(view_period) = changes.view_period {
        user.view_period = view_period;
    }
    if let Some(anchor_day) = changes.period_anchor_day {
        user.period_anchor_day = Some(anchor_day);
    }

    connection.execute(
        "UPDATE user SET name = ?1, view_period = ?2, period_anchor_day = ?3 WHERE id = ?4",
        params![
            user.name,
            user.view_period.as_str(),
            user.period_anchor_day,
            user_id.as_i64()
        ],
    )?;

    Ok(user)
}

#[cfg(test)]
mod view_period_tests {
    use crate::{Error, user::ViewPeriod};

    #[test]
    fn parse_accepts_the_three_cadences() {
        assert_eq!(ViewPeriod::parse("weekly"), Ok(ViewPeriod::Weekly));
        assert_eq!(ViewPeriod::parse("biweekly"), Ok(ViewPeriod::Biweekly));
        assert_eq!(ViewPeriod::parse("monthly"), Ok(ViewPeriod::Monthly));
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!(ViewPeriod::parse("fortnightly"), Err(Error::InvalidViewPeriod));
    }

    #[test]
    fn db_values_fall_back_to_monthly() {
        assert_eq!(ViewPeriod::from_db_value("quarterly"), ViewPeriod::Monthly);
        assert_eq!(ViewPeriod::from_db_value(""), ViewPeriod::Monthly);
        assert_eq!(ViewPeriod::from_db_value("weekly"), ViewPeriod::Weekly);
    }
}
