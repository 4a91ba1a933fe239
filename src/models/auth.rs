use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRole;

/// Claims embedded in both JWTs. Access and refresh tokens share the claim
/// shape but are signed with distinct secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user UUID
    pub email: String,
    pub role: UserRole,
    /// Unique per token, so pairs issued within the same second still differ.
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

/// An access/refresh pair, as issued by the server and as persisted by the
/// client under the fixed `accessToken`/`refreshToken` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Identity extracted from a validated access token by the auth extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}
