use sqlx::PgPool;
use uuid::Uuid;

use crate::models::address::{Address, CreateAddressRequest, UpdateAddressRequest};

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Address>> {
    sqlx::query_as("SELECT * FROM addresses WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Address>> {
    sqlx::query_as("SELECT * FROM addresses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// A new default address demotes the user's previous default.
pub async fn clear_default(pool: &PgPool, user_id: Uuid) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE addresses SET is_default = FALSE, updated_at = NOW()
         WHERE user_id = $1 AND is_default = TRUE",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    req: &CreateAddressRequest,
) -> sqlx::Result<Address> {
    sqlx::query_as(
        "INSERT INTO addresses (user_id, label, line1, line2, city, state, postal_code, country, is_default)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(user_id)
    .bind(req.label.as_deref().unwrap_or("Home"))
    .bind(&req.line1)
    .bind(&req.line2)
    .bind(&req.city)
    .bind(&req.state)
    .bind(&req.postal_code)
    .bind(&req.country)
    .bind(req.is_default.unwrap_or(false))
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateAddressRequest,
) -> sqlx::Result<Address> {
    sqlx::query_as(
        "UPDATE addresses SET
            label = COALESCE($1, label),
            line1 = COALESCE($2, line1),
            line2 = COALESCE($3, line2),
            city = COALESCE($4, city),
            state = COALESCE($5, state),
            postal_code = COALESCE($6, postal_code),
            country = COALESCE($7, country),
            is_default = COALESCE($8, is_default),
            updated_at = NOW()
         WHERE id = $9
         RETURNING *",
    )
    .bind(&req.label)
    .bind(&req.line1)
    .bind(&req.line2)
    .bind(&req.city)
    .bind(&req.state)
    .bind(&req.postal_code)
    .bind(&req.country)
    .bind(req.is_default)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM addresses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
