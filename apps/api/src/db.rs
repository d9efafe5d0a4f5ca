use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Schema bootstrap, run at startup. Idempotent.
const CREATE_INSIGHTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS insights (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        brand       INTEGER NOT NULL,
        created_at  TEXT NOT NULL,
        text        TEXT NOT NULL
    )
";

/// Creates a SQLite connection pool and ensures the schema exists.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite database at {database_url}");

    // The default database file lives under tmp/; the directory must exist
    // before SQLite can create the file.
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::query(CREATE_INSIGHTS_TABLE).execute(&pool).await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    // One connection: every handle must see the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::query(CREATE_INSIGHTS_TABLE)
        .execute(&pool)
        .await
        .expect("failed to create schema");

    pool
}
