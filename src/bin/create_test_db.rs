use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Month};

use fintrack_rs::{
    NewGoal, Priority, Transaction, TransactionType, UserId, create_goal, create_transaction,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The user ID that owns the demo goals and transactions.
    #[arg(long, short, default_value = "demo-user")]
    user_id: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let user_id = UserId::new(&args.user_id)?;

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating goals for {user_id}...");

    let goals = [
        (
            "Emergency fund",
            10_000.0,
            4_200.0,
            Date::from_calendar_date(2026, Month::June, 30)?,
            "Three months of expenses",
            Priority::High,
            500.0,
        ),
        (
            "Japan trip",
            6_000.0,
            1_500.0,
            Date::from_calendar_date(2027, Month::March, 1)?,
            "Two weeks in spring",
            Priority::Medium,
            300.0,
        ),
        (
            "New laptop",
            2_500.0,
            2_500.0,
            Date::from_calendar_date(2025, Month::December, 1)?,
            "",
            Priority::Low,
            0.0,
        ),
    ];

    for (name, target_amount, current_amount, target_date, description, priority, monthly) in goals
    {
        create_goal(
            NewGoal {
                user_id: user_id.clone(),
                name: name.to_owned(),
                target_amount,
                current_amount,
                target_date,
                description: description.to_owned(),
                priority,
                monthly_contribution: monthly,
            },
            &conn,
        )?;
    }

    println!("Creating transactions for {user_id}...");

    for month in [Month::July, Month::August, Month::September] {
        let payday = Date::from_calendar_date(2025, month, 1)?;
        let midmonth = Date::from_calendar_date(2025, month, 15)?;

        let transactions = [
            Transaction::build(user_id.clone(), TransactionType::Income, 5_200.0, payday)
                .category("Salary")
                .description("Monthly pay"),
            Transaction::build(user_id.clone(), TransactionType::Expense, 1_800.0, payday)
                .category("Housing")
                .description("Rent"),
            Transaction::build(user_id.clone(), TransactionType::Expense, 412.35, midmonth)
                .category("Groceries")
                .description("Supermarket"),
            Transaction::build(user_id.clone(), TransactionType::Expense, 96.50, midmonth)
                .category("Dining")
                .description("Dinner out"),
            Transaction::build(user_id.clone(), TransactionType::Expense, 64.99, midmonth)
                .category("Utilities")
                .description("Internet")
                .note(Some("Fibre plan".to_owned())),
        ];

        for transaction in transactions {
            create_transaction(transaction, &conn)?;
        }
    }

    println!("Success!");

    Ok(())
}
