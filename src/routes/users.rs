use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    middleware::auth::require_admin,
    models::{
        address::{Address, CreateAddressRequest, UpdateAddressRequest},
        auth::AuthenticatedUser,
        user::{UpdateProfileRequest, UserDto},
    },
    services::users::UserService,
    AppState,
};

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserDto>, ApiError> {
    let profile = UserService::get_profile(&state.db, user.user_id).await?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let profile = UserService::update_profile(&state.db, user.user_id, &body).await?;
    Ok(Json(profile))
}

pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Address>>, ApiError> {
    let addresses = UserService::list_addresses(&state.db, user.user_id).await?;
    Ok(Json(addresses))
}

pub async fn create_address(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    let address = UserService::create_address(&state.db, user.user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn update_address(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAddressRequest>,
) -> Result<Json<Address>, ApiError> {
    let address = UserService::update_address(&state.db, user.user_id, id, &body).await?;
    Ok(Json(address))
}

pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    UserService::delete_address(&state.db, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Admin

pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    require_admin(&user)?;
    let users = UserService::list_all(&state.db).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    let (profile, addresses) = UserService::get_by_id(&state.db, id).await?;
    let mut body = serde_json::to_value(profile).map_err(|e| ApiError::Internal(e.into()))?;
    if let Some(obj) = body.as_object_mut() {
        obj.insert("addresses".into(), json!(addresses));
    }
    Ok(Json(body))
}
