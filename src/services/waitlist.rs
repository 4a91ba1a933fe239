use sqlx::PgPool;

use crate::db::waitlist;
use crate::errors::ApiError;
use crate::models::waitlist::{WaitlistCountResponse, WaitlistJoinResponse};

pub struct WaitlistService;

impl WaitlistService {
    /// Emails are stored lowercased so the uniqueness check is
    /// case-insensitive.
    pub async fn join(pool: &PgPool, email: &str) -> Result<WaitlistJoinResponse, ApiError> {
        let email = email.to_lowercase();

        if waitlist::find_by_email(pool, &email).await?.is_some() {
            return Err(ApiError::Conflict(
                "This email is already on the waitlist".into(),
            ));
        }

        waitlist::insert(pool, &email).await?;

        Ok(WaitlistJoinResponse {
            message: "Successfully joined the waitlist".into(),
            email,
        })
    }

    pub async fn count(pool: &PgPool) -> Result<WaitlistCountResponse, ApiError> {
        let count = waitlist::count(pool).await?;
        Ok(WaitlistCountResponse { count })
    }
}
