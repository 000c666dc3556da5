//! Database query helpers for listing transactions.

use rusqlite::{Connection, types::Value};
use time::Date;

use crate::{Error, database_id::DatabaseId, user::UserId};

use super::core::{TRANSACTION_COLUMNS, Transaction, map_row_to_transaction};

/// Optional filters for the transaction list endpoint.
#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    /// Only return transactions in this category.
    pub category_id: Option<DatabaseId>,
    /// Only return transactions recorded by this user.
    pub user_id: Option<UserId>,
    /// Only return transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only return transactions on or before this date.
    pub end_date: Option<Date>,
}

impl TransactionFilter {
    /// Build the WHERE clause conditions and parameters for this filter,
    /// always scoped to `budget_id`.
    fn to_conditions(&self, budget_id: DatabaseId) -> (String, Vec<Value>) {
        let mut conditions = vec!["budget_id = ?1".to_owned()];
        let mut parameters = vec![Value::from(budget_id)];

        if let Some(category_id) = self.category_id {
            parameters.push(Value::from(category_id));
            conditions.push(format!("category_id = ?{}", parameters.len()));
        }
        if let Some(user_id) = self.user_id {
            parameters.push(Value::from(user_id.as_i64()));
            conditions.push(format!("user_id = ?{}", parameters.len()));
        }
        if let Some(start_date) = self.start_date {
            parameters.push(Value::from(start_date.to_string()));
            conditions.push(format!("date >= ?{}", parameters.len()));
        }
        if let Some(end_date) = self.end_date {
            parameters.push(Value::from(end_date.to_string()));
            conditions.push(format!("date <= ?{}", parameters.len()));
        }

        (conditions.join(" AND "), parameters)
    }
}

/// Get one page of a budget's transactions matching `filter`, sorted by date
/// descending, along with the total number of matching rows.
///
/// Sorting breaks ties by ID to keep the order stable after updates.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - Database connection fails
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn get_transactions_page(
    budget_id: DatabaseId,
    filter: &TransactionFilter,
    page: u64,
    per_page: u64,
    connection: &Connection,
) -> Result<(Vec<Transaction>, u64), Error> {
    let (where_clause, parameters) = filter.to_conditions(budget_id);

    let total: u64 = connection.query_one(
        &format!("SELECT COUNT(*) FROM \"transaction\" WHERE {where_clause}"),
        rusqlite::params_from_iter(parameters.clone()),
        |row| row.get::<_, i64>(0),
    )? as u64;

    let offset = page.saturating_sub(1) * per_page;
    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE {where_clause} \
        ORDER BY date DESC, id DESC LIMIT {per_page} OFFSET {offset}"
    );

    let transactions = connection
        .prepare(&query)?
        .query_map(rusqlite::params_from_iter(parameters), map_row_to_transaction)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((transactions, total))
}

/// Get all of a budget's transactions dated within `start` and `end`
/// (inclusive).
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - Database connection fails
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn get_transactions_in_range(
    budget_id: DatabaseId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
            WHERE budget_id = ?1 AND date BETWEEN ?2 AND ?3 \
            ORDER BY date ASC, id ASC"
        ))?
        .query_map(
            rusqlite::params![budget_id, start.to_string(), end.to_string()],
            map_row_to_transaction,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::create_category,
        db::initialize,
        test_utils::{insert_test_member, insert_test_user_with_budget},
        transaction::{NewTransaction, create_transaction},
    };

    use super::{TransactionFilter, get_transactions_in_range, get_transactions_page};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn filters_compose_and_pagination_counts_all_matches() {
        let conn = get_test_connection();
        let (user, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        let member = insert_test_member(&conn, &budget, "member@bar.baz");
        let food = create_category(budget.id, "Food", "#FF0000", "🍔", &conn).unwrap();
        let transport = create_category(budget.id, "Transport", "#00FF00", "🚌", &conn).unwrap();

        for i in 0..5 {
            create_transaction(
                NewTransaction {
                    user_id: user.id,
                    budget_id: budget.id,
                    amount: -(100 + i),
                    description: format!("groceries #{i}"),
                    category_id: food.id,
                    date: date!(2024 - 08 - 01),
                },
                &conn,
            )
            .unwrap();
        }
        create_transaction(
            NewTransaction {
                user_id: member.id,
                budget_id: budget.id,
                amount: -250,
                description: "bus fare".to_owned(),
                category_id: transport.id,
                date: date!(2024 - 08 - 02),
            },
            &conn,
        )
        .unwrap();

        let (all, total) =
            get_transactions_page(budget.id, &TransactionFilter::default(), 1, 50, &conn).unwrap();
        assert_eq!(total, 6);
        assert_eq!(all.len(), 6);

        let filter = TransactionFilter {
            category_id: Some(food.id),
            ..Default::default()
        };
        let (food_only, food_total) =
            get_transactions_page(budget.id, &filter, 1, 2, &conn).unwrap();
        assert_eq!(food_total, 5);
        assert_eq!(food_only.len(), 2, "page size must be respected");

        let filter = TransactionFilter {
            user_id: Some(member.id),
            ..Default::default()
        };
        let (member_only, member_total) =
            get_transactions_page(budget.id, &filter, 1, 50, &conn).unwrap();
        assert_eq!(member_total, 1);
        assert_eq!(member_only[0].description, "bus fare");
    }

    #[test]
    fn list_is_sorted_by_date_descending() {
        let conn = get_test_connection();
        let (user, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        let category = create_category(budget.id, "Food", "#FF0000", "🍔", &conn).unwrap();

        for (amount, day) in [(-100, 3), (-200, 1), (-300, 2)] {
            create_transaction(
                NewTransaction {
                    user_id: user.id,
                    budget_id: budget.id,
                    amount,
                    description: "meal".to_owned(),
                    category_id: category.id,
                    date: time::Date::from_calendar_date(2024, time::Month::August, day).unwrap(),
                },
                &conn,
            )
            .unwrap();
        }

        let (transactions, _) =
            get_transactions_page(budget.id, &TransactionFilter::default(), 1, 50, &conn).unwrap();

        let days: Vec<u8> = transactions
            .iter()
            .map(|transaction| transaction.date.day())
            .collect();
        assert_eq!(days, vec![3, 2, 1]);
    }

    #[test]
    fn date_range_is_inclusive_and_scoped_to_budget() {
        let conn = get_test_connection();
        let (user, budget) = insert_test_user_with_budget(&conn, "foo@bar.baz");
        let (other_user, other_budget) = insert_test_user_with_budget(&conn, "other@bar.baz");
        let category = create_category(budget.id, "Food", "#FF0000", "🍔", &conn).unwrap();
        let other_category =
            create_category(other_budget.id, "Food", "#FF0000", "🍔", &conn).unwrap();

        for day in 1..=5 {
            create_transaction(
                NewTransaction {
                    user_id: user.id,
                    budget_id: budget.id,
                    amount: -100,
                    description: "meal".to_owned(),
                    category_id: category.id,
                    date: time::Date::from_calendar_date(2024, time::Month::August, day).unwrap(),
                },
                &conn,
            )
            .unwrap();
        }
        create_transaction(
            NewTransaction {
                user_id: other_user.id,
                budget_id: other_budget.id,
                amount: -999,
                description: "other budget meal".to_owned(),
                category_id: other_category.id,
                date: date!(2024 - 08 - 03),
            },
            &conn,
        )
        .unwrap();

        let got = get_transactions_in_range(
            budget.id,
            date!(2024 - 08 - 02),
            date!(2024 - 08 - 04),
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 3);
        assert!(got.iter().all(|transaction| transaction.budget_id == budget.id));
    }
}
