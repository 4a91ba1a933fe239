use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    middleware::auth::require_admin,
    models::{
        auth::AuthenticatedUser,
        category::{
            Category, CategoryDetail, CategoryNode, CreateCategoryRequest, UpdateCategoryRequest,
        },
    },
    services::categories::CategoryService,
    AppState,
};

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryNode>>, ApiError> {
    let tree = CategoryService::list_tree(&state.db).await?;
    Ok(Json(tree))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetail>, ApiError> {
    let detail = CategoryService::find_by_slug(&state.db, &slug).await?;
    Ok(Json(detail))
}

pub async fn create_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    require_admin(&user)?;
    let category = CategoryService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    require_admin(&user)?;
    let category = CategoryService::update(&state.db, id, &body).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&user)?;
    CategoryService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
