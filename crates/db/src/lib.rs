//! Database layer for the gamification engine
//!
//! All access goes through runtime-checked sqlx queries against SQLite.
//! Counters are updated with SQL-level increments (`col = col + ?`), never
//! read-modify-write in application memory.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use tracing::info;
use uuid::Uuid;

pub mod activity;
pub mod challenges;
pub mod leaderboard;
pub mod profiles;
pub mod unlocks;


/// Create a database connection pool
pub async fn create_pool(database_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    info!("Connecting to database...");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    info!("Database connected");
    Ok(pool)
}

/// Run database migrations from SQL files
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    info!("Running migrations...");

    let migration_sql = include_str!("../../../migrations/001_initial.sql");
    sqlx::raw_sql(migration_sql).execute(pool).await?;

    info!("Migrations complete");
    Ok(())
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(s).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
