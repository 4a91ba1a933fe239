use axum::{extract::State, http::StatusCode, Json};

use crate::{
    errors::ApiError,
    models::waitlist::{JoinWaitlistRequest, WaitlistCountResponse, WaitlistJoinResponse},
    services::waitlist::WaitlistService,
    AppState,
};

pub async fn join_waitlist(
    State(state): State<AppState>,
    Json(body): Json<JoinWaitlistRequest>,
) -> Result<(StatusCode, Json<WaitlistJoinResponse>), ApiError> {
    let response = WaitlistService::join(&state.db, &body.email).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn waitlist_count(
    State(state): State<AppState>,
) -> Result<Json<WaitlistCountResponse>, ApiError> {
    let response = WaitlistService::count(&state.db).await?;
    Ok(Json(response))
}
