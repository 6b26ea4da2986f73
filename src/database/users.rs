use sqlx::PgPool;
use tracing::info;

use super::models::User;

pub async fn insert(
    pool: &PgPool,
    email: &str,
    first_name: &str,
    last_name: &str,
    password_hash: &str,
) -> Result<i64, sqlx::Error> {
    info!("Inserting user with email {}", email);
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (email, first_name, last_name, password_hash) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Exact-match token lookup; this is the whole of token resolution.
pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE auth_token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await
}

/// Overwrites any prior token; a user holds at most one active session.
pub async fn set_token(pool: &PgPool, id: i64, token: &str) -> Result<(), sqlx::Error> {
    info!("Setting auth token for user {}", id);
    sqlx::query("UPDATE users SET auth_token = $1 WHERE id = $2")
        .bind(token)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Clears the matching token. Returns the number of rows affected so the
/// caller can distinguish "logged out" from "was not authenticated".
pub async fn clear_token(pool: &PgPool, token: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET auth_token = NULL WHERE auth_token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    email: &str,
    first_name: &str,
    last_name: &str,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    info!("Updating user {}", id);
    sqlx::query(
        "UPDATE users SET email = $1, first_name = $2, last_name = $3, password_hash = $4 \
         WHERE id = $5",
    )
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_image(pool: &PgPool, id: i64, filename: &str) -> Result<(), sqlx::Error> {
    info!("Saving image reference for user {}", id);
    sqlx::query("UPDATE users SET image_filename = $1 WHERE id = $2")
        .bind(filename)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn clear_image(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    info!("Removing image reference for user {}", id);
    sqlx::query("UPDATE users SET image_filename = NULL WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
