use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::users;
use crate::errors::ApiError;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, User, UserRole};
use crate::services::tokens::TokenIssuer;

/// Fixed bcrypt cost for passwords and refresh-token hashes.
const BCRYPT_COST: u32 = 10;

/// Deliberately identical for unknown email and bad password, so the
/// response does not reveal which accounts exist.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthService;

impl AuthService {
    /// Create the user, issue a token pair, and persist the refresh-token
    /// hash. Fails with Conflict when the email is already taken
    /// (case-sensitive exact match on the stored value).
    pub async fn register(
        pool: &PgPool,
        tokens: &TokenIssuer,
        req: &RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        if users::find_by_email(pool, &req.email).await?.is_some() {
            return Err(ApiError::Conflict("Email already in use".into()));
        }

        let password_hash = hash_blocking(req.password.clone()).await?;
        let role = req.role.unwrap_or(UserRole::Customer);

        let user = users::create(
            pool,
            &req.email,
            &password_hash,
            &req.first_name,
            &req.last_name,
            &role.to_string(),
        )
        .await?;

        Self::issue_session(pool, tokens, user).await
    }

    pub async fn login(
        pool: &PgPool,
        tokens: &TokenIssuer,
        req: &LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        let user = users::find_by_email(pool, &req.email)
            .await?
            .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

        let valid = verify_blocking(req.password.clone(), user.password_hash.clone()).await?;
        if !valid {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        Self::issue_session(pool, tokens, user).await
    }

    /// Exchange a refresh token for a new pair. The presented token must
    /// verify under the refresh secret AND match the single stored hash;
    /// success overwrites that hash, so the previous refresh token becomes
    /// permanently unusable even before its expiry (single-use rotation).
    pub async fn refresh(
        pool: &PgPool,
        tokens: &TokenIssuer,
        presented: &str,
    ) -> Result<AuthResponse, ApiError> {
        let claims = tokens.decode_refresh(presented)?;
        let user_id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Access denied"))?;

        let user = users::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Access denied"))?;

        let stored_hash = user
            .refresh_token_hash
            .clone()
            .ok_or_else(|| ApiError::unauthorized("Access denied"))?;

        let valid = verify_blocking(token_fingerprint(presented), stored_hash).await?;
        if !valid {
            return Err(ApiError::unauthorized("Access denied"));
        }

        Self::issue_session(pool, tokens, user).await
    }

    /// Clears the stored refresh-token hash. Idempotent: succeeds even when
    /// nothing is stored.
    pub async fn logout(pool: &PgPool, user_id: Uuid) -> Result<(), ApiError> {
        users::clear_refresh_token_hash(pool, user_id).await?;
        Ok(())
    }

    /// Shared tail of register/login/refresh: issue a pair and persist the
    /// refresh-token hash. Last write wins on the hash column; a stale
    /// concurrent refresh invalidates itself rather than corrupting state.
    async fn issue_session(
        pool: &PgPool,
        tokens: &TokenIssuer,
        user: User,
    ) -> Result<AuthResponse, ApiError> {
        let role: UserRole = user.role.parse().unwrap_or(UserRole::Customer);
        let pair = tokens.issue(user.id, &user.email, role)?;

        let refresh_hash = hash_blocking(token_fingerprint(&pair.refresh_token)).await?;
        users::update_refresh_token_hash(pool, user.id, &refresh_hash).await?;

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: user.into(),
        })
    }
}

/// bcrypt only considers the first 72 bytes of its input, and two JWTs for
/// the same user share a longer common prefix than that. Hash a fixed-length
/// digest of the token instead of the token itself.
fn token_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

// bcrypt is CPU-bound; run it off the async executor so a burst of auth
// traffic cannot stall unrelated requests.

async fn hash_blocking(data: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(data, BCRYPT_COST))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(|e| ApiError::Internal(e.into()))
}

async fn verify_blocking(data: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(data, &hash))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(|e| ApiError::Internal(e.into()))
}
