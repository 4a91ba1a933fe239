//! User repository. Exposes only the queries the session and user
//! subsystems need, with no implicit relationship traversal.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role, \
     refresh_token_hash, created_at, updated_at";

/// Case-sensitive exact match on the stored email.
pub async fn find_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
) -> sqlx::Result<User> {
    sqlx::query_as(&format!(
        "INSERT INTO users (email, password_hash, first_name, last_name, role)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .fetch_one(pool)
    .await
}

/// Overwrite the stored refresh-token hash (rotation). Last write wins; a
/// stale concurrent refresh simply invalidates itself.
pub async fn update_refresh_token_hash(
    pool: &PgPool,
    user_id: Uuid,
    hash: &str,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET refresh_token_hash = $1, updated_at = NOW() WHERE id = $2")
        .bind(hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Idempotent: succeeds whether or not a hash is currently stored.
pub async fn clear_refresh_token_hash(pool: &PgPool, user_id: Uuid) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET refresh_token_hash = NULL, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!(
        "UPDATE users SET
            first_name = COALESCE($1, first_name),
            last_name = COALESCE($2, last_name),
            updated_at = NOW()
         WHERE id = $3
         RETURNING {USER_COLUMNS}"
    ))
    .bind(first_name)
    .bind(last_name)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_all(pool: &PgPool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}
