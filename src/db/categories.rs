use sqlx::PgPool;
use uuid::Uuid;

use crate::models::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};

pub async fn list_roots(pool: &PgPool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as("SELECT * FROM categories WHERE parent_id IS NULL ORDER BY name ASC")
        .fetch_all(pool)
        .await
}

pub async fn list_children(pool: &PgPool, parent_id: Uuid) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as("SELECT * FROM categories WHERE parent_id = $1 ORDER BY name ASC")
        .bind(parent_id)
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Category>> {
    sqlx::query_as("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<Category>> {
    sqlx::query_as("SELECT * FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn count_children(pool: &PgPool, id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn count_products(pool: &PgPool, id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn create(pool: &PgPool, req: &CreateCategoryRequest) -> sqlx::Result<Category> {
    sqlx::query_as(
        "INSERT INTO categories (name, slug, image, parent_id)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.image)
    .bind(req.parent_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateCategoryRequest,
) -> sqlx::Result<Category> {
    sqlx::query_as(
        "UPDATE categories SET
            name = COALESCE($1, name),
            slug = COALESCE($2, slug),
            image = COALESCE($3, image),
            parent_id = COALESCE($4, parent_id),
            updated_at = NOW()
         WHERE id = $5
         RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.image)
    .bind(req.parent_id)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
