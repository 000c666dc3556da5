//! The category table and the built-in system categories.

use rusqlite::{Connection, params};
use serde::Serialize;

use crate::{Error, database_id::DatabaseId};

/// An expense or income category.
///
/// System categories are shared by all budgets and have no `budget_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    /// The id for the category.
    pub id: DatabaseId,
    /// The budget that owns the category, or `None` for system categories.
    pub budget_id: Option<DatabaseId>,
    /// The display name of the category.
    pub name: String,
    /// The display color as a hex string, e.g. "#10B981".
    pub color: String,
    /// The emoji shown next to the category name.
    pub icon: String,
    /// Whether this is a built-in category.
    pub is_system: bool,
}

pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            budget_id INTEGER REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            icon TEXT NOT NULL,
            is_system INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_category(row: &rusqlite::Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
        is_system: row.get(5)?,
    })
}

/// Create a custom category for the budget `budget_id`.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn create_category(
    budget_id: DatabaseId,
    name: &str,
    color: &str,
    icon: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (budget_id, name, color, icon, is_system) VALUES (?1, ?2, ?3, ?4, 0)",
        params![budget_id, name, color, icon],
    )?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        budget_id: Some(budget_id),
        name: name.to_owned(),
        color: color.to_owned(),
        icon: icon.to_owned(),
        is_system: false,
    })
}

/// Get the category with the ID `category_id`.
///
/// # Errors
/// Returns [Error::NotFound] if `category_id` does not refer to a category,
/// or [Error::SqlError] for other SQL errors.
pub fn get_category_by_id(
    category_id: DatabaseId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .query_one(
            "SELECT id, budget_id, name, color, icon, is_system FROM category WHERE id = ?1",
            params![category_id],
            map_row_to_category,
        )
        .map_err(|error| error.into())
}

/// Get the system categories plus the categories owned by `budget_id`,
/// sorted by name.
///
/// Pass `None` to get only the system categories.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_categories_for_budget(
    budget_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, budget_id, name, color, icon, is_system FROM category
            WHERE (budget_id IS NULL AND is_system = 1) OR budget_id = ?1
            ORDER BY name ASC",
        )?
        .query_map(params![budget_id], map_row_to_category)?
        .map(|category_result| category_result.map_err(Error::SqlError))
        .collect()
}

/// The built-in categories seeded into every database.
const SYSTEM_CATEGORIES: [(&str, &str, &str); 20] = [
    // Expenses
    ("Housing", "#8B5CF6", "🏠"),
    ("Utilities", "#3B82F6", "⚡"),
    ("Groceries", "#10B981", "🛒"),
    ("Dining & Restaurants", "#F59E0B", "🍽️"),
    ("Transportation", "#EF4444", "🚗"),
    ("Healthcare", "#EC4899", "🏥"),
    ("Entertainment", "#6366F1", "🎬"),
    ("Shopping", "#8B5CF6", "🛍️"),
    ("Personal Care", "#14B8A6", "💆"),
    ("Education", "#F97316", "📚"),
    ("Subscriptions", "#A855F7", "📱"),
    ("Insurance", "#06B6D4", "🛡️"),
    ("Savings", "#22C55E", "💰"),
    ("Debt Payments", "#DC2626", "💳"),
    ("Gifts & Donations", "#F472B6", "🎁"),
    ("Miscellaneous", "#6B7280", "📦"),
    // Income
    ("Salary", "#059669", "💵"),
    ("Freelance", "#0891B2", "💼"),
    ("Investments", "#7C3AED", "📈"),
    ("Other Income", "#84CC16", "💸"),
];

/// Insert any system categories that are not already in the database.
///
/// Safe to call on every startup.
///
/// # Errors
/// Returns an error if an SQL related error occurred.
pub fn seed_system_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    for (name, color, icon) in SYSTEM_CATEGORIES {
        connection.execute(
            "INSERT INTO category (budget_id, name, color, icon, is_system)
            SELECT NULL, ?1, ?2, ?3, 1
            WHERE NOT EXISTS (
                SELECT 1 FROM category WHERE name = ?1 AND is_system = 1 AND budget_id IS NULL
            )",
            params![name, color, icon],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod category_tests {
    use rusqlite::Connection;

    use crate::{db::initialize, test_utils::insert_test_user_with_budget};

    use super::{
        create_category, get_categories_for_budget, get_category_by_id, seed_system_categories,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn seeding_is_idempotent() {
        let conn = get_test_connection();

        let first_count = get_categories_for_budget(None, &conn).unwrap().len();
        seed_system_categories(&conn).unwrap();
        let second_count = get_categories_for_budget(None, &conn).unwrap().len();

        assert_eq!(first_count, 20);
        assert_eq!(second_count, 20);
    }

    #[test]
    fn create_category_belongs_to_budget() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");

        let category = create_category(budget.id, "Pets", "#FF0000", "🐕", &conn).unwrap();

        assert!(category.id > 0);
        assert_eq!(category.budget_id, Some(budget.id));
        assert!(!category.is_system);

        let got = get_category_by_id(category.id, &conn).unwrap();
        assert_eq!(got, category);
    }

    #[test]
    fn listing_includes_system_and_budget_categories() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        create_category(budget.id, "Pets", "#FF0000", "🐕", &conn).unwrap();

        let categories = get_categories_for_budget(Some(budget.id), &conn).unwrap();

        assert_eq!(categories.len(), 21);
        assert!(categories.iter().any(|category| category.name == "Pets"));
    }

    #[test]
    fn listing_excludes_other_budgets_categories() {
        let conn = get_test_connection();
        let (_, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        let (_, other_budget) = insert_test_user_with_budget(&conn, "other@bar.baz");
        create_category(other_budget.id, "Secret", "#000000", "🕵", &conn).unwrap();

        let categories = get_categories_for_budget(Some(budget.id), &conn).unwrap();

        assert!(categories.iter().all(|category| category.name != "Secret"));
    }

    #[test]
    fn listing_is_sorted_by_name() {
        let conn = get_test_connection();

        let categories = get_categories_for_budget(None, &conn).unwrap();

        let mut sorted = categories.clone();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(categories, sorted);
    }
}
