use sqlx::PgPool;
use uuid::Uuid;

use crate::db::categories;
use crate::errors::ApiError;
use crate::models::category::{
    Category, CategoryDetail, CategoryNode, CreateCategoryRequest, UpdateCategoryRequest,
};

pub struct CategoryService;

impl CategoryService {
    /// Top-level categories with two levels of children, name-ascending.
    pub async fn list_tree(pool: &PgPool) -> Result<Vec<CategoryNode>, ApiError> {
        let roots = categories::list_roots(pool).await?;
        let mut tree = Vec::with_capacity(roots.len());
        for root in roots {
            let children = categories::list_children(pool, root.id).await?;
            let mut child_nodes = Vec::with_capacity(children.len());
            for child in children {
                let grandchildren = categories::list_children(pool, child.id).await?;
                child_nodes.push(CategoryNode {
                    category: child,
                    children: grandchildren
                        .into_iter()
                        .map(|c| CategoryNode {
                            category: c,
                            children: Vec::new(),
                        })
                        .collect(),
                });
            }
            tree.push(CategoryNode {
                category: root,
                children: child_nodes,
            });
        }
        Ok(tree)
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<CategoryDetail, ApiError> {
        let category = categories::find_by_slug(pool, slug)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;
        let children = categories::list_children(pool, category.id).await?;
        let product_count = categories::count_products(pool, category.id).await?;
        Ok(CategoryDetail {
            category,
            children,
            product_count,
        })
    }

    pub async fn create(pool: &PgPool, req: &CreateCategoryRequest) -> Result<Category, ApiError> {
        if categories::find_by_slug(pool, &req.slug).await?.is_some() {
            return Err(ApiError::Conflict("Category slug already in use".into()));
        }
        Ok(categories::create(pool, req).await?)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateCategoryRequest,
    ) -> Result<Category, ApiError> {
        categories::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;
        Ok(categories::update(pool, id, req).await?)
    }

    /// Deleting a category that still has children or products is a
    /// referential-rule violation, surfaced as BadRequest.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        categories::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;

        if categories::count_children(pool, id).await? > 0 {
            return Err(ApiError::BadRequest(
                "Cannot delete a category that has child categories".into(),
            ));
        }
        if categories::count_products(pool, id).await? > 0 {
            return Err(ApiError::BadRequest(
                "Cannot delete a category that has products".into(),
            ));
        }

        categories::delete(pool, id).await?;
        Ok(())
    }
}
