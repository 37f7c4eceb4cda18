use sqlx::SqliteExecutor;

use crate::{error::AppError, models::spot::Spot};

pub async fn list_all<'e, E>(exec: E) -> Result<Vec<Spot>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let spots = sqlx::query_as::<_, Spot>("SELECT id, name, type FROM spots ORDER BY id ASC")
        .fetch_all(exec)
        .await?;
    Ok(spots)
}

pub async fn exists<'e, E>(exec: E, spot_id: i64) -> Result<bool, AppError>
where
    E: SqliteExecutor<'e>,
{
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM spots WHERE id = ?1")
        .bind(spot_id)
        .fetch_optional(exec)
        .await?;
    Ok(found.is_some())
}

/// Takes the write lock on a spot row; `false` when the spot does not exist.
///
/// SQLite has no `SELECT ... FOR UPDATE`. A no-op update makes this the first
/// write of the transaction, so the transaction holds the database write lock
/// before it reads anything and cannot act on a stale snapshot.
pub async fn lock<'e, E>(exec: E, spot_id: i64) -> Result<bool, AppError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE spots SET id = id WHERE id = ?1")
        .bind(spot_id)
        .execute(exec)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert<'e, E>(exec: E, name: &str, kind: &str) -> Result<i64, AppError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("INSERT INTO spots (name, type) VALUES (?1, ?2)")
        .bind(name)
        .bind(kind)
        .execute(exec)
        .await?;
    Ok(result.last_insert_rowid())
}
