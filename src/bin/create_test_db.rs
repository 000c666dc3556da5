//! Create and populate a database for manual testing.

use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use folda_finances::{
    PasswordHash,
    account::{AccountKind, NewAccount, create_account},
    budget::{BudgetRole, create_budget},
    category::{create_category, get_categories_for_budget},
    category_budget::{AllocationType, SplitInput, create_category_budget, replace_splits},
    income::{IncomeFrequency, NewExpectedIncome, create_expected_income},
    initialize_db,
    transaction::{NewTransaction, create_transaction},
    user::{NewUser, User, create_user, set_user_budget},
};

/// The password both test users log in with.
const TEST_PASSWORD: &str = "averystrongandlongpassword";

/// A utility for creating a test database with sample data.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path for the new SQLite database.
    #[arg(long)]
    db_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if db_path.exists() {
        eprintln!("A file already exists at {db_path:#?}, refusing to overwrite it.");
        exit(1);
    }

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    let alice = insert_user(&connection, "alice@example.com", "Alice")?;
    let budget = create_budget("Household", alice.id, &connection)?;
    set_user_budget(alice.id, Some(budget.id), BudgetRole::Owner, &connection)?;

    let bob = insert_user(&connection, "bob@example.com", "Bob")?;
    set_user_budget(bob.id, Some(budget.id), BudgetRole::ReadWrite, &connection)?;

    create_account(
        NewAccount {
            budget_id: budget.id,
            name: "Joint Checking".to_owned(),
            kind: AccountKind::Checking,
            balance: 250_000,
            currency: "USD".to_owned(),
            notes: String::new(),
        },
        &connection,
    )?;

    let groceries = find_category(&connection, "Groceries")?;
    let dining = find_category(&connection, "Dining & Restaurants")?;
    let pets = create_category(budget.id, "Pets", "#F97316", "🐕", &connection)?;

    create_category_budget(budget.id, groceries, 60_000, AllocationType::Pooled, &connection)?;
    create_category_budget(budget.id, pets.id, 10_000, AllocationType::Pooled, &connection)?;
    let dining_budget =
        create_category_budget(budget.id, dining, 40_000, AllocationType::Pooled, &connection)?;
    replace_splits(
        dining_budget.id,
        budget.id,
        &[
            SplitInput {
                user_id: alice.id.as_i64(),
                allocation_percentage: Some(60.0),
                allocation_amount: None,
            },
            SplitInput {
                user_id: bob.id.as_i64(),
                allocation_percentage: Some(40.0),
                allocation_amount: None,
            },
        ],
        &connection,
    )?;

    create_expected_income(
        NewExpectedIncome {
            budget_id: budget.id,
            name: "Salary".to_owned(),
            amount: 500_000,
            frequency: IncomeFrequency::Monthly,
            next_date: OffsetDateTime::now_utc().date() + Duration::days(14),
        },
        &connection,
    )?;

    insert_sample_transactions(&connection, &alice, &bob, budget.id, groceries, dining)?;

    println!("Created test database at {db_path:#?}.");
    println!("Log in as alice@example.com or bob@example.com with the password {TEST_PASSWORD:?}.");

    Ok(())
}

fn insert_user(connection: &Connection, email: &str, name: &str) -> Result<User, Box<dyn Error>> {
    // Cost 4 keeps repeated test database creation fast.
    let password_hash = PasswordHash::from_raw_password(TEST_PASSWORD, 4)?;

    let user = create_user(
        NewUser {
            email: email.to_owned(),
            name: name.to_owned(),
            password_hash,
            period_start_date: OffsetDateTime::now_utc().date(),
        },
        connection,
    )?;

    Ok(user)
}

fn find_category(connection: &Connection, name: &str) -> Result<i64, Box<dyn Error>> {
    let categories = get_categories_for_budget(None, connection)?;

    categories
        .into_iter()
        .find(|category| category.name == name)
        .map(|category| category.id)
        .ok_or_else(|| format!("system category {name:?} was not seeded").into())
}

fn insert_sample_transactions(
    connection: &Connection,
    alice: &User,
    bob: &User,
    budget_id: i64,
    groceries: i64,
    dining: i64,
) -> Result<(), Box<dyn Error>> {
    let today = OffsetDateTime::now_utc().date();

    let samples = [
        (alice, -4521, "Countdown weekly shop", groceries, 1),
        (alice, -1890, "Sunday farmers market", groceries, 3),
        (bob, -2750, "Pizzeria Napoli", dining, 2),
        (bob, -680, "Coffee with Sam", dining, 5),
        (alice, -5230, "Countdown weekly shop", groceries, 8),
    ];

    for (user, amount, description, category_id, days_ago) in samples {
        create_transaction(
            NewTransaction {
                user_id: user.id,
                budget_id,
                amount,
                description: description.to_owned(),
                category_id,
                date: today - Duration::days(days_ago),
            },
            connection,
        )?;
    }

    Ok(())
}
