#![allow(missing_docs)]
//! Shared fixtures for database-backed tests.

use rusqlite::Connection;
use time::macros::date;

use crate::{
    budget::{Budget, BudgetRole, create_budget},
    password::PasswordHash,
    user::{NewUser, User, create_user, get_user_by_id, set_user_budget},
};

/// Insert a user that owns a fresh budget, mirroring what registration does.
pub(crate) fn insert_test_user_with_budget(
    connection: &Connection,
    email: &str,
) -> (User, Budget) {
    let user = create_user(
        NewUser {
            email: email.to_owned(),
            name: "Test User".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
            period_start_date: date!(2024 - 01 - 01),
        },
        connection,
    )
    .expect("could not create test user");

    let budget = create_budget("Test Budget", user.id, connection)
        .expect("could not create test budget");
    set_user_budget(user.id, Some(budget.id), BudgetRole::Owner, connection)
        .expect("could not add test user to budget");

    let user = get_user_by_id(user.id, connection).expect("could not reload test user");

    (user, budget)
}

/// Insert an additional read-write member into an existing budget.
pub(crate) fn insert_test_member(
    connection: &Connection,
    budget: &Budget,
    email: &str,
) -> User {
    let user = create_user(
        NewUser {
            email: email.to_owned(),
            name: "Test Member".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
            period_start_date: date!(2024 - 01 - 01),
        },
        connection,
    )
    .expect("could not create test member");

    set_user_budget(user.id, Some(budget.id), BudgetRole::ReadWrite, connection)
        .expect("could not add test member to budget");

    get_user_by_id(user.id, connection).expect("could not reload test member")
}
