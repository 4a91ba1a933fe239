use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::auth::{Claims, TokenPair};
use crate::models::user::UserRole;

/// Issues and verifies the two JWT families. Access and refresh tokens carry
/// the same claim shape but are signed with distinct secrets. Missing secrets
/// are caught at config load, so construction here cannot fail.
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
}

impl TokenIssuer {
    pub fn new(config: &Config) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
            access_ttl_seconds: config.jwt_expiry_seconds,
            refresh_ttl_seconds: config.jwt_refresh_expiry_days * 86_400,
        }
    }

    /// Produce a signed access/refresh pair for the given identity.
    pub fn issue(&self, user_id: Uuid, email: &str, role: UserRole) -> Result<TokenPair, ApiError> {
        let now = Utc::now().timestamp() as usize;

        let access_claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.access_ttl_seconds as usize,
        };
        let refresh_claims = Claims {
            jti: Uuid::new_v4().to_string(),
            exp: now + self.refresh_ttl_seconds as usize,
            ..access_claims.clone()
        };

        let header = Header::new(Algorithm::HS256);
        let access_token = encode(&header, &access_claims, &self.access_encoding)
            .map_err(|e| ApiError::Internal(e.into()))?;
        let refresh_token = encode(&header, &refresh_claims, &self.refresh_encoding)
            .map_err(|e| ApiError::Internal(e.into()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn decode_access(&self, token: &str) -> Result<Claims, ApiError> {
        Self::decode_with(token, &self.access_decoding)
    }

    pub fn decode_refresh(&self, token: &str) -> Result<Claims, ApiError> {
        Self::decode_with(token, &self.refresh_decoding)
    }

    fn decode_with(token: &str, key: &DecodingKey) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".into(),
            jwt_secret: "access-secret".into(),
            jwt_refresh_secret: "refresh-secret".into(),
            jwt_expiry_seconds: 900,
            jwt_refresh_expiry_days: 7,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_origin: "http://localhost:3000".into(),
        }
    }

    #[test]
    fn issued_tokens_round_trip_under_their_own_secret() {
        let issuer = TokenIssuer::new(&test_config());
        let user_id = Uuid::new_v4();
        let pair = issuer.issue(user_id, "a@x.com", UserRole::Customer).unwrap();

        let access = issuer.decode_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, user_id.to_string());
        assert_eq!(access.email, "a@x.com");
        assert_eq!(access.role, UserRole::Customer);

        let refresh = issuer.decode_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, user_id.to_string());
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn tokens_are_not_interchangeable_across_secrets() {
        let issuer = TokenIssuer::new(&test_config());
        let pair = issuer
            .issue(Uuid::new_v4(), "a@x.com", UserRole::Admin)
            .unwrap();

        assert!(issuer.decode_access(&pair.refresh_token).is_err());
        assert!(issuer.decode_refresh(&pair.access_token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        assert!(issuer.decode_access("not.a.jwt").is_err());
    }
}
