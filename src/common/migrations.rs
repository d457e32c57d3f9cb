// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Only drop tables if RESET_DB environment variable is set to "true"
    // This prevents data loss on server restarts
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("Dropped old tables");
    }

    create_tables(pool).await?;
    create_indexes(pool).await?;
    seed_default_categories(pool).await?;

    info!("Database migration completed successfully");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Drop tables in reverse dependency order
    let tables = vec!["expenses", "categories", "oauth_states", "users"];

    for table in tables {
        let _ = sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await;
    }

    Ok(())
}

async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT UNIQUE NOT NULL,
            username TEXT UNIQUE,
            full_name TEXT,
            hashed_password TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_verified INTEGER NOT NULL DEFAULT 0,
            google_id TEXT,
            provider TEXT NOT NULL DEFAULT 'local',
            avatar_url TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            last_login TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Categories table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Expenses table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            currency TEXT NOT NULL,
            amount REAL,
            date TEXT DEFAULT (datetime('now')),
            owner_id INTEGER,
            category_id INTEGER,
            FOREIGN KEY(owner_id) REFERENCES users(id),
            FOREIGN KEY(category_id) REFERENCES categories(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Pending OAuth login flows, keyed by the CSRF state nonce.
    // A row is written when a flow starts and deleted by the first callback
    // attempt that presents its state.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS oauth_states (
            state TEXT PRIMARY KEY,
            created_at TEXT DEFAULT (datetime('now')),
            expires_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = vec![
        "CREATE INDEX IF NOT EXISTS idx_expenses_owner ON expenses(owner_id)",
        "CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category_id)",
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        "CREATE INDEX IF NOT EXISTS idx_users_google_id ON users(google_id)",
    ];

    for index in indexes {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}

/// Common expense categories seeded on first startup
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Food & Dining", "Restaurants, groceries, and food expenses"),
    ("Transportation", "Gas, public transport, car maintenance"),
    ("Shopping", "Clothing, electronics, and general purchases"),
    ("Entertainment", "Movies, games, books, and leisure activities"),
    ("Bills & Utilities", "Electricity, water, internet, phone bills"),
    ("Healthcare", "Medical expenses, pharmacy, health insurance"),
    ("Travel", "Vacation, business trips, accommodation"),
    ("Education", "Courses, books, training, school fees"),
    ("Home & Garden", "Home improvement, furniture, gardening"),
    ("Insurance", "Life, car, home insurance payments"),
    ("Investments", "Stocks, bonds, retirement contributions"),
    ("Gifts & Donations", "Presents, charity, donations"),
    ("Personal Care", "Haircuts, cosmetics, personal hygiene"),
    ("Business", "Business expenses, office supplies"),
    ("Taxes", "Income tax, property tax, other tax payments"),
    (
        "Miscellaneous",
        "Other expenses that don't fit other categories",
    ),
];

/// Populate the categories table with the default set when it is empty
async fn seed_default_categories(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Ok(());
    }

    let mut created = 0;
    for (name, description) in DEFAULT_CATEGORIES {
        sqlx::query("INSERT OR IGNORE INTO categories (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await?;
        created += 1;
    }

    info!(created = created, "Seeded default categories");

    Ok(())
}
