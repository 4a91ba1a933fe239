//! Token persistence for the client. The browser analogue is local storage;
//! here the same fixed keys back a JSON file or an in-memory map. Storing
//! both tokens client-side is an explicit trust boundary: anything that can
//! read the store owns the session.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::models::auth::TokenPair;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<TokenPair>;
    fn save(&self, pair: &TokenPair);
    fn clear(&self);
}

/// Volatile store, used in tests and short-lived tools.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<TokenPair>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<TokenPair> {
        self.inner.lock().ok()?.clone()
    }

    fn save(&self, pair: &TokenPair) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(pair.clone());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
    }
}

/// File-backed store persisting `{ "accessToken": ..., "refreshToken": ... }`.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<TokenPair> {
        let raw = std::fs::read(&self.path).ok()?;
        let value: serde_json::Value = serde_json::from_slice(&raw).ok()?;
        Some(TokenPair {
            access_token: value.get(ACCESS_TOKEN_KEY)?.as_str()?.to_string(),
            refresh_token: value.get(REFRESH_TOKEN_KEY)?.as_str()?.to_string(),
        })
    }

    fn save(&self, pair: &TokenPair) {
        let value = serde_json::json!({
            ACCESS_TOKEN_KEY: pair.access_token,
            REFRESH_TOKEN_KEY: pair.refresh_token,
        });
        if let Ok(raw) = serde_json::to_vec_pretty(&value) {
            // A lost persist after rotation strands the session; the caller
            // cannot recover it, but the operator should see why.
            if let Err(e) = std::fs::write(&self.path, raw) {
                tracing::warn!("failed to persist tokens to {}: {e}", self.path.display());
            }
        }
    }

    fn clear(&self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "a.b.c".into(),
            refresh_token: "d.e.f".into(),
        }
    }

    #[test]
    fn memory_store_round_trips_and_clears() {
        let store = MemoryTokenStore::default();
        assert!(store.load().is_none());
        store.save(&pair());
        assert_eq!(store.load(), Some(pair()));
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn file_store_save_into_missing_directory_is_survivable() {
        let path = std::env::temp_dir()
            .join(format!("no-such-dir-{}", uuid::Uuid::new_v4()))
            .join("tokens.json");
        let store = FileTokenStore::new(&path);
        store.save(&pair());
        assert!(store.load().is_none());
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let path = std::env::temp_dir().join(format!("tokens-{}.json", uuid::Uuid::new_v4()));
        let store = FileTokenStore::new(&path);
        assert!(store.load().is_none());
        store.save(&pair());
        assert_eq!(store.load(), Some(pair()));
        store.clear();
        assert!(store.load().is_none());
    }
}
