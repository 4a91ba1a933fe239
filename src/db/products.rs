use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::product::{
    CreateProductRequest, CreateVariantRequest, Product, ProductQuery, ProductSortBy,
    ProductVariant, UpdateProductRequest, UpdateVariantRequest,
};

/// Push the listing filters shared by the page query and the count query.
/// Public listings only ever see active products.
fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, query: &'a ProductQuery) {
    qb.push(" WHERE active = TRUE");
    if let Some(search) = &query.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category_id) = query.category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(min) = query.min_price {
        qb.push(" AND base_price >= ").push_bind(min);
    }
    if let Some(max) = query.max_price {
        qb.push(" AND base_price <= ").push_bind(max);
    }
    if query.featured == Some(true) {
        qb.push(" AND featured = TRUE");
    }
}

pub async fn search(
    pool: &PgPool,
    query: &ProductQuery,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Product>> {
    let mut qb = QueryBuilder::new("SELECT * FROM products");
    push_filters(&mut qb, query);
    let order = match query.sort_by.unwrap_or(ProductSortBy::Newest) {
        ProductSortBy::PriceAsc => " ORDER BY base_price ASC",
        ProductSortBy::PriceDesc => " ORDER BY base_price DESC",
        ProductSortBy::Newest => " ORDER BY created_at DESC",
        ProductSortBy::Name => " ORDER BY name ASC",
    };
    qb.push(order)
        .push(" LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    qb.build_query_as().fetch_all(pool).await
}

pub async fn count(pool: &PgPool, query: &ProductQuery) -> sqlx::Result<i64> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_filters(&mut qb, query);
    qb.build_query_scalar().fetch_one(pool).await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Product>> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<Product>> {
    sqlx::query_as("SELECT * FROM products WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn list_variants(pool: &PgPool, product_id: Uuid) -> sqlx::Result<Vec<ProductVariant>> {
    sqlx::query_as("SELECT * FROM product_variants WHERE product_id = $1 ORDER BY created_at ASC")
        .bind(product_id)
        .fetch_all(pool)
        .await
}

pub async fn find_variant(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<ProductVariant>> {
    sqlx::query_as("SELECT * FROM product_variants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, req: &CreateProductRequest) -> sqlx::Result<Product> {
    sqlx::query_as(
        "INSERT INTO products (name, slug, description, base_price, wholesale_price,
                               wholesale_min, images, category_id, featured, active)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.description)
    .bind(req.base_price)
    .bind(req.wholesale_price)
    .bind(req.wholesale_min)
    .bind(&req.images)
    .bind(req.category_id)
    .bind(req.featured.unwrap_or(false))
    .bind(req.active.unwrap_or(true))
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateProductRequest,
) -> sqlx::Result<Product> {
    sqlx::query_as(
        "UPDATE products SET
            name = COALESCE($1, name),
            slug = COALESCE($2, slug),
            description = COALESCE($3, description),
            base_price = COALESCE($4, base_price),
            wholesale_price = COALESCE($5, wholesale_price),
            wholesale_min = COALESCE($6, wholesale_min),
            images = COALESCE($7, images),
            category_id = COALESCE($8, category_id),
            featured = COALESCE($9, featured),
            active = COALESCE($10, active),
            updated_at = NOW()
         WHERE id = $11
         RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.description)
    .bind(req.base_price)
    .bind(req.wholesale_price)
    .bind(req.wholesale_min)
    .bind(&req.images)
    .bind(req.category_id)
    .bind(req.featured)
    .bind(req.active)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn create_variant(
    pool: &PgPool,
    product_id: Uuid,
    req: &CreateVariantRequest,
) -> sqlx::Result<ProductVariant> {
    sqlx::query_as(
        "INSERT INTO product_variants (product_id, sku, size, color, material, price_offset, stock, active)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(product_id)
    .bind(&req.sku)
    .bind(&req.size)
    .bind(&req.color)
    .bind(&req.material)
    .bind(req.price_offset.unwrap_or(0.0))
    .bind(req.stock)
    .bind(req.active.unwrap_or(true))
    .fetch_one(pool)
    .await
}

pub async fn update_variant(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateVariantRequest,
) -> sqlx::Result<ProductVariant> {
    sqlx::query_as(
        "UPDATE product_variants SET
            sku = COALESCE($1, sku),
            size = COALESCE($2, size),
            color = COALESCE($3, color),
            material = COALESCE($4, material),
            price_offset = COALESCE($5, price_offset),
            stock = COALESCE($6, stock),
            active = COALESCE($7, active)
         WHERE id = $8
         RETURNING *",
    )
    .bind(&req.sku)
    .bind(&req.size)
    .bind(&req.color)
    .bind(&req.material)
    .bind(req.price_offset)
    .bind(req.stock)
    .bind(req.active)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn delete_variant(pool: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM product_variants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
