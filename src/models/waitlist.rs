use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct JoinWaitlistRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct WaitlistJoinResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct WaitlistCountResponse {
    pub count: i64,
}
