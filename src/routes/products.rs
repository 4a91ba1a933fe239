use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    middleware::auth::require_admin,
    models::{
        auth::AuthenticatedUser,
        product::{
            CreateProductRequest, CreateVariantRequest, Product, ProductDetail, ProductPage,
            ProductQuery, ProductVariant, UpdateProductRequest, UpdateVariantRequest,
        },
    },
    services::products::ProductService,
    AppState,
};

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductPage>, ApiError> {
    let page = ProductService::search(&state.db, &query).await?;
    Ok(Json(page))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>, ApiError> {
    let detail = ProductService::find_by_slug(&state.db, &slug).await?;
    Ok(Json(detail))
}

pub async fn create_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    require_admin(&user)?;
    let product = ProductService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    require_admin(&user)?;
    let product = ProductService::update(&state.db, id, &body).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&user)?;
    ProductService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_variant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(body): Json<CreateVariantRequest>,
) -> Result<(StatusCode, Json<ProductVariant>), ApiError> {
    require_admin(&user)?;
    let variant = ProductService::create_variant(&state.db, product_id, &body).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn update_variant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((product_id, variant_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateVariantRequest>,
) -> Result<Json<ProductVariant>, ApiError> {
    require_admin(&user)?;
    let variant =
        ProductService::update_variant(&state.db, product_id, variant_id, &body).await?;
    Ok(Json(variant))
}

pub async fn delete_variant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((product_id, variant_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    require_admin(&user)?;
    ProductService::delete_variant(&state.db, product_id, variant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
