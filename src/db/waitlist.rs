use sqlx::PgPool;

use crate::models::waitlist::WaitlistEntry;

pub async fn find_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<WaitlistEntry>> {
    sqlx::query_as("SELECT * FROM waitlist_entries WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &PgPool, email: &str) -> sqlx::Result<WaitlistEntry> {
    sqlx::query_as("INSERT INTO waitlist_entries (email) VALUES ($1) RETURNING *")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn count(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM waitlist_entries")
        .fetch_one(pool)
        .await
}
