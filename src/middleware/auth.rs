use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::errors::ApiError;
use crate::models::auth::{AuthenticatedUser, Claims};
use crate::models::user::UserRole;

/// Extension type to carry the access-token secret through request
/// extensions.
#[derive(Clone)]
pub struct JwtSecret(pub String);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        let secret = parts
            .extensions
            .get::<JwtSecret>()
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("JWT secret not configured")))?;

        decode_access_token(token, &secret.0)
    }
}

pub fn decode_access_token(token: &str, secret: &str) -> Result<AuthenticatedUser, ApiError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
    let claims = data.claims;

    Ok(AuthenticatedUser {
        user_id: claims
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?,
        email: claims.email,
        role: claims.role,
    })
}

pub fn require_admin(user: &AuthenticatedUser) -> Result<(), ApiError> {
    match user.role {
        UserRole::Admin => Ok(()),
        _ => Err(ApiError::Forbidden("Admin access required".into())),
    }
}
