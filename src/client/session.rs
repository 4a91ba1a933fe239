//! Client-side session state, rebuilt from the persisted token pair.
//!
//! Trust-on-decode: the client never verifies the token signature, only its
//! shape and expiry claim. The token is opaque to the client beyond
//! optimistic UI state; the server re-verifies on every protected call.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::store::TokenStore;
use crate::models::user::UserRole;

/// The claim fields the client cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct DecodedClaims {
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
}

/// Decode the middle segment of a three-part token without verifying the
/// signature. Returns None for anything that is not shaped like a JWT.
pub fn decode_claims(token: &str) -> Option<DecodedClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// User projection reconstructed from access-token claims, not re-fetched
/// from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Default)]
pub struct SessionCache {
    user: Option<SessionUser>,
}

impl SessionCache {
    /// Rebuild session state from the store. An absent pair, undecodable
    /// claims, or a past expiry all leave the cache unauthenticated and
    /// discard whatever was persisted.
    pub fn hydrate(store: &dyn TokenStore) -> Self {
        let Some(pair) = store.load() else {
            return Self::default();
        };

        let unauthenticated = || {
            store.clear();
            Self::default()
        };

        let Some(claims) = decode_claims(&pair.access_token) else {
            return unauthenticated();
        };
        if claims.exp <= Utc::now().timestamp() {
            return unauthenticated();
        }
        let Ok(id) = claims.sub.parse() else {
            return unauthenticated();
        };

        Self {
            user: Some(SessionUser {
                id,
                email: claims.email,
                role: claims.role,
            }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::store::MemoryTokenStore;
    use crate::models::auth::{Claims, TokenPair};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_with_exp(exp: i64) -> String {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@x.com".into(),
            role: UserRole::Customer,
            jti: Uuid::new_v4().to_string(),
            iat: 0,
            exp: exp as usize,
        };
        // Signed with a secret the client never sees: hydration must not care.
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"irrelevant"),
        )
        .unwrap()
    }

    fn seeded(access: &str) -> MemoryTokenStore {
        let store = MemoryTokenStore::default();
        store.save(&TokenPair {
            access_token: access.to_string(),
            refresh_token: "r.e.f".into(),
        });
        store
    }

    #[test]
    fn empty_store_hydrates_unauthenticated() {
        let store = MemoryTokenStore::default();
        let session = SessionCache::hydrate(&store);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn valid_token_hydrates_user_projection_from_claims() {
        let access = token_with_exp(Utc::now().timestamp() + 900);
        let store = seeded(&access);
        let session = SessionCache::hydrate(&store);
        let user = session.user().expect("authenticated");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, UserRole::Customer);
        assert!(store.load().is_some());
    }

    #[test]
    fn expired_token_clears_store_and_state() {
        let access = token_with_exp(Utc::now().timestamp() - 10);
        let store = seeded(&access);
        let session = SessionCache::hydrate(&store);
        assert!(!session.is_authenticated());
        assert!(store.load().is_none());
    }

    #[test]
    fn malformed_token_clears_store_and_state() {
        let store = seeded("definitely-not-a-jwt");
        let session = SessionCache::hydrate(&store);
        assert!(!session.is_authenticated());
        assert!(store.load().is_none());
    }

    #[test]
    fn garbage_payload_segment_clears_store_and_state() {
        let store = seeded("aaaa.!!!!.cccc");
        let session = SessionCache::hydrate(&store);
        assert!(!session.is_authenticated());
        assert!(store.load().is_none());
    }
}
