use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{categories, products};
use crate::errors::ApiError;
use crate::models::product::{
    CreateProductRequest, CreateVariantRequest, Product, ProductDetail, ProductPage,
    ProductQuery, ProductVariant, UpdateProductRequest, UpdateVariantRequest,
};

const DEFAULT_PAGE_SIZE: u32 = 12;
const MAX_PAGE_SIZE: u32 = 100;

pub struct ProductService;

impl ProductService {
    pub async fn search(pool: &PgPool, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        // Both values come from the query string; widen before multiplying
        // so an extreme page number cannot overflow u32.
        let offset = (i64::from(page) - 1) * i64::from(limit);

        let items = products::search(pool, query, i64::from(limit), offset).await?;
        let total = products::count(pool, query).await?;
        let total_pages = (total as u32).div_ceil(limit);

        Ok(ProductPage {
            items,
            total,
            page,
            limit,
            total_pages,
        })
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<ProductDetail, ApiError> {
        let product = products::find_by_slug(pool, slug)
            .await?
            .ok_or_else(|| ApiError::not_found("Product not found"))?;
        let variants = products::list_variants(pool, product.id).await?;
        let category = categories::find_by_id(pool, product.category_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;
        Ok(ProductDetail {
            product,
            variants,
            category,
        })
    }

    pub async fn create(pool: &PgPool, req: &CreateProductRequest) -> Result<Product, ApiError> {
        if products::find_by_slug(pool, &req.slug).await?.is_some() {
            return Err(ApiError::Conflict("Product slug already in use".into()));
        }
        categories::find_by_id(pool, req.category_id)
            .await?
            .ok_or_else(|| ApiError::BadRequest("Referenced category does not exist".into()))?;
        Ok(products::create(pool, req).await?)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateProductRequest,
    ) -> Result<Product, ApiError> {
        products::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product not found"))?;
        if let Some(category_id) = req.category_id {
            categories::find_by_id(pool, category_id)
                .await?
                .ok_or_else(|| ApiError::BadRequest("Referenced category does not exist".into()))?;
        }
        Ok(products::update(pool, id, req).await?)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        products::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product not found"))?;
        products::delete(pool, id).await?;
        Ok(())
    }

    pub async fn create_variant(
        pool: &PgPool,
        product_id: Uuid,
        req: &CreateVariantRequest,
    ) -> Result<ProductVariant, ApiError> {
        products::find_by_id(pool, product_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product not found"))?;
        Ok(products::create_variant(pool, product_id, req).await?)
    }

    pub async fn update_variant(
        pool: &PgPool,
        product_id: Uuid,
        variant_id: Uuid,
        req: &UpdateVariantRequest,
    ) -> Result<ProductVariant, ApiError> {
        Self::owned_variant(pool, product_id, variant_id).await?;
        Ok(products::update_variant(pool, variant_id, req).await?)
    }

    pub async fn delete_variant(
        pool: &PgPool,
        product_id: Uuid,
        variant_id: Uuid,
    ) -> Result<(), ApiError> {
        Self::owned_variant(pool, product_id, variant_id).await?;
        products::delete_variant(pool, variant_id).await?;
        Ok(())
    }

    async fn owned_variant(
        pool: &PgPool,
        product_id: Uuid,
        variant_id: Uuid,
    ) -> Result<ProductVariant, ApiError> {
        let variant = products::find_variant(pool, variant_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Variant not found"))?;
        if variant.product_id != product_id {
            return Err(ApiError::not_found("Variant not found"));
        }
        Ok(variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn extreme_page_numbers_do_not_overflow_the_offset() {
        // Nothing listens behind this pool, so the call can only fail at the
        // connection. The point is that it gets that far: computing the
        // offset for the largest representable page must not panic.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://127.0.0.1:1/nothing")
            .unwrap();
        let query = ProductQuery {
            page: Some(u32::MAX),
            limit: Some(100),
            ..ProductQuery::default()
        };
        let result = ProductService::search(&pool, &query).await;
        assert!(result.is_err());
    }
}
