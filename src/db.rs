use std::{str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;

pub type DbPool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<DbPool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &DbPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|err| AppError::Other(err.into()))
}

const DEFAULT_SPOTS: &[(&str, &str)] = &[
    ("A1", "standard"),
    ("A2", "standard"),
    ("A3", "standard"),
    ("A4", "standard"),
    ("B1", "standard"),
    ("B2", "standard"),
    ("B3", "compact"),
    ("B4", "compact"),
    ("E1", "ev"),
    ("E2", "ev"),
];

/// Fills an empty spot catalog; leaves an existing one alone.
pub async fn seed_default_spots(pool: &DbPool) -> Result<(), AppError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM spots")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for (name, kind) in DEFAULT_SPOTS {
        crate::repository::spot::insert(&mut *tx, name, kind).await?;
    }
    tx.commit().await?;
    info!(count = DEFAULT_SPOTS.len(), "seeded default spot catalog");
    Ok(())
}
