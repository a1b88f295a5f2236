//! Database initialization
//!
//! Creates the database file and its parent folder on first run and brings the
//! schema up idempotently on every start.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets the catalog be read while a reorder batch is writing
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query(&format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
        .execute(&pool)
        .await?;

    create_documents_table(&pool).await?;

    Ok(pool)
}

/// Create the documents table
///
/// One row per document; `body` holds the document as JSON text.
pub async fn create_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL CHECK (json_valid(body)),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
