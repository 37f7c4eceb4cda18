use sqlx::SqliteExecutor;

use crate::{error::AppError, models::user::User};

pub async fn find_by_username<'e, E>(exec: E, username: &str) -> Result<Option<User>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash FROM users WHERE username = ?1",
    )
    .bind(username)
    .fetch_optional(exec)
    .await?;
    Ok(user)
}

pub async fn insert<'e, E>(exec: E, username: &str, password_hash: &str) -> Result<i64, AppError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?1, ?2)")
        .bind(username)
        .bind(password_hash)
        .execute(exec)
        .await?;
    Ok(result.last_insert_rowid())
}
