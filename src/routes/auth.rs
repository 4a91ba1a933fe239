use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    errors::ApiError,
    models::{
        auth::AuthenticatedUser,
        user::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest},
    },
    services::auth::AuthService,
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let response = AuthService::register(&state.db, &state.tokens, &body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = AuthService::login(&state.db, &state.tokens, &body).await?;
    Ok(Json(response))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = AuthService::refresh(&state.db, &state.tokens, &body.refresh_token).await?;
    Ok(Json(response))
}

pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    AuthService::logout(&state.db, user.user_id).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}
