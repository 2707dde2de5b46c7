use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use pocket_ledger::{
    AppConfig, BudgetFields, Email, GoalFields, NewArticle, NewUser, PasswordHash,
    TransactionFields, TransactionType, Username, ValidatedPassword, create_article,
    create_budget, create_goal, create_user, initialize_db, record_transaction,
};

/// A utility for creating a test database for the Pocket Ledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const ARTICLES: [(&str, &str, &str, &str); 5] = [
    (
        "Pay yourself first",
        "Move money into savings before you spend any of it.",
        "Set up an automatic transfer on payday so saving happens before spending does. \
        Start with a small percentage and raise it whenever your income goes up.",
        "saving",
    ),
    (
        "The 50/30/20 rule",
        "A simple way to split your income between needs, wants and savings.",
        "Spend about half of your after-tax income on needs, up to thirty percent on wants, \
        and put at least twenty percent towards savings and paying off debt.",
        "budgeting",
    ),
    (
        "Building an emergency fund",
        "Why three to six months of expenses can keep a bad month from becoming a crisis.",
        "Keep the fund somewhere easy to reach but separate from your everyday account. \
        Top it back up after you use it.",
        "saving",
    ),
    (
        "Tracking small purchases",
        "Coffee and snacks add up faster than you think.",
        "Record every purchase for a month and look at the totals by category. \
        The small items are often the easiest place to find savings.",
        "budgeting",
    ),
    (
        "Index funds for beginners",
        "Low-cost, diversified investing without picking individual stocks.",
        "An index fund buys every company in a market index, which spreads risk and keeps fees low. \
        Invest regularly and leave the money alone for the long term.",
        "investing",
    ),
];

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

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        NewUser {
            username: Username::new("test")?,
            email: Email::new("test@example.com")?,
            password_hash,
        },
        &conn,
    )?;

    println!("Adding articles...");

    let now = OffsetDateTime::now_utc();
    for (age_in_days, (title, summary, content, category)) in ARTICLES.into_iter().enumerate() {
        create_article(
            NewArticle {
                title: title.to_owned(),
                summary: summary.to_owned(),
                content: content.to_owned(),
                category: category.to_owned(),
                created_at: now - Duration::days(age_in_days as i64),
            },
            &conn,
        )?;
    }

    println!("Adding transactions, a budget and a goal...");

    let config = AppConfig::default();
    let today = now.date();

    let goal = create_goal(
        user.id,
        GoalFields {
            name: "Emergency fund".to_owned(),
            target_amount: Decimal::new(5000, 0),
            current_amount: None,
            target_date: today + Duration::days(180),
        },
        &conn,
    )?;

    create_budget(
        user.id,
        BudgetFields {
            name: "Groceries".to_owned(),
            amount: Decimal::new(400, 0),
            category: "food".to_owned(),
            period: "monthly".to_owned(),
            start_date: today - Duration::days(15),
            end_date: today + Duration::days(15),
        },
        &config,
        &conn,
    )?;

    for months_ago in 0..6 {
        let date = today - Duration::days(30 * months_ago);

        record_transaction(
            user.id,
            TransactionFields {
                amount: Decimal::new(320_000, 2),
                type_: TransactionType::Income,
                category: "salary".to_owned(),
                description: "Pay".to_owned(),
                date,
            },
            Some(goal.id),
            &config,
            &conn,
        )?;

        for (cents, category, description) in [
            (8_450, "food", "Groceries"),
            (4_000, "transport", "Bus pass"),
            (150_000, "housing", "Rent"),
        ] {
            record_transaction(
                user.id,
                TransactionFields {
                    amount: Decimal::new(cents, 2),
                    type_: TransactionType::Expense,
                    category: category.to_owned(),
                    description: description.to_owned(),
                    date,
                },
                None,
                &config,
                &conn,
            )?;
        }
    }

    println!("Success! Log in with the username \"test\" and password \"test\".");

    Ok(())
}
