use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::{
    error::AppError,
    models::reservation::{HourlyCount, NewReservation, Reservation},
};

const COLUMNS: &str = "id, spot_id, user_id, start_time, end_time, status";

/// Active reservations on any spot whose window overlaps `[start, end]`.
pub async fn find_active_in_range<'e, E>(
    exec: E,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Reservation>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {COLUMNS} FROM reservations \
         WHERE status = 'active' AND start_time < ?1 AND end_time > ?2 \
         ORDER BY spot_id ASC, start_time ASC"
    );
    let rows = sqlx::query_as::<_, Reservation>(&sql)
        .bind(end)
        .bind(start)
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

pub async fn count_active_overlaps<'e, E>(
    exec: E,
    spot_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64, AppError>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reservations \
         WHERE spot_id = ?1 AND status = 'active' AND start_time < ?2 AND end_time > ?3",
    )
    .bind(spot_id)
    .bind(end)
    .bind(start)
    .fetch_one(exec)
    .await?;
    Ok(count)
}

pub async fn insert<'e, E>(exec: E, new: &NewReservation) -> Result<i64, AppError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "INSERT INTO reservations (spot_id, user_id, start_time, end_time, status) \
         VALUES (?1, ?2, ?3, ?4, 'active')",
    )
    .bind(new.spot_id)
    .bind(new.user_id)
    .bind(new.start_time)
    .bind(new.end_time)
    .execute(exec)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn find_by_id<'e, E>(
    exec: E,
    reservation_id: i64,
) -> Result<Option<Reservation>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM reservations WHERE id = ?1");
    let row = sqlx::query_as::<_, Reservation>(&sql)
        .bind(reservation_id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

/// Row-lock counterpart of [`super::spot::lock`]; `false` when absent.
pub async fn lock<'e, E>(exec: E, reservation_id: i64) -> Result<bool, AppError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE reservations SET id = id WHERE id = ?1")
        .bind(reservation_id)
        .execute(exec)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn mark_completed<'e, E>(exec: E, reservation_id: i64) -> Result<bool, AppError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE reservations SET status = 'completed' WHERE id = ?1 AND status = 'active'",
    )
    .bind(reservation_id)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Completes every active reservation whose window closed before `now` in a
/// single statement and returns the released rows.
pub async fn complete_expired<'e, E>(
    exec: E,
    now: DateTime<Utc>,
) -> Result<Vec<Reservation>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "UPDATE reservations SET status = 'completed' \
         WHERE status = 'active' AND end_time < ?1 RETURNING {COLUMNS}"
    );
    let rows = sqlx::query_as::<_, Reservation>(&sql)
        .bind(now)
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

/// Reservations of any status grouped by UTC start hour, busiest first.
/// Equal counts fall back to ascending hour.
pub async fn hourly_counts<'e, E>(exec: E) -> Result<Vec<HourlyCount>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, HourlyCount>(
        "SELECT CAST(strftime('%H', start_time) AS INTEGER) AS hour, COUNT(*) AS count \
         FROM reservations GROUP BY hour ORDER BY count DESC, hour ASC",
    )
    .fetch_all(exec)
    .await?;
    Ok(rows)
}
