//! SQLite connection pool for the employee store.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

const CREATE_EMPLOYEES_TABLE: &str = "CREATE TABLE IF NOT EXISTS employees (
    employee_id  TEXT PRIMARY KEY NOT NULL,
    name         TEXT NOT NULL,
    position     TEXT NOT NULL,
    email        TEXT NOT NULL,
    salary       REAL NOT NULL,
    country_code TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    modified_at  TEXT NOT NULL
)";

/// Open (creating if missing) the database at `database_url` and make
/// sure the `employees` table exists.
///
/// `sqlite::memory:` gets a single long-lived connection, since every
/// new connection would otherwise see its own empty database.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = database_url.contains(":memory:");
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;
    sqlx::query(CREATE_EMPLOYEES_TABLE).execute(&pool).await?;

    Ok(pool)
}
