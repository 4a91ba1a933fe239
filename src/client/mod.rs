//! Typed API client with transparent access-token refresh.
//!
//! A request that comes back 401 triggers at most one refresh and one retry.
//! Refreshes are single-flight: concurrent failing requests queue behind one
//! network call and reuse its result.

pub mod session;
pub mod store;

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::auth::TokenPair;
use crate::models::user::{AuthResponse, RegisterRequest, UserDto};
use session::SessionCache;
use store::TokenStore;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response, carrying the envelope's message.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("not logged in")]
    Unauthenticated,

    /// Refresh was rejected; the persisted session has been cleared and the
    /// caller should route the user to sign-in.
    #[error("session expired")]
    SessionExpired,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    /// Single-flight gate: at most one refresh network call at a time.
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            refresh_gate: Mutex::new(()),
        }
    }

    // Auth flows

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let body = serde_json::json!({
            "email": req.email,
            "password": req.password,
            "firstName": req.first_name,
            "lastName": req.last_name,
            "role": req.role,
        });
        let resp = self
            .http
            .post(self.url("/auth/register"))
            .json(&body)
            .send()
            .await?;
        let auth: AuthResponse = into_result(resp).await?;
        self.persist(&auth);
        Ok(auth)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let auth: AuthResponse = into_result(resp).await?;
        self.persist(&auth);
        Ok(auth)
    }

    /// Best-effort server-side revocation; local state is cleared regardless.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result: Result<Value, ClientError> =
            self.request(Method::POST, "/auth/logout", None).await;
        self.store.clear();
        result.map(|_| ())
    }

    /// Rebuild session state from the persisted tokens.
    pub fn session(&self) -> SessionCache {
        SessionCache::hydrate(self.store.as_ref())
    }

    pub async fn profile(&self) -> Result<UserDto, ClientError> {
        self.get("/users/profile").await
    }

    // Generic authenticated JSON calls

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ClientError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ClientError> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let pair = self.store.load().ok_or(ClientError::Unauthenticated)?;
        let resp = self
            .send_with_retry(Method::DELETE, path, &pair.access_token, None)
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from(resp).await)
        }
    }

    // Interceptor core

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let pair = self.store.load().ok_or(ClientError::Unauthenticated)?;
        let resp = self
            .send_with_retry(method, path, &pair.access_token, body)
            .await?;
        into_result(resp).await
    }

    /// Send once; on 401, refresh (or wait for the in-flight refresh) and
    /// retry exactly once. A request that fails again after its retry is
    /// surfaced as-is and never triggers a second refresh.
    async fn send_with_retry(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let resp = self.dispatch(method.clone(), path, access_token, body).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        let fresh = self.refreshed_access_token(access_token).await?;
        let retry = self.dispatch(method, path, &fresh, body).await?;
        Ok(retry)
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let mut req = self
            .http
            .request(method, self.url(path))
            .bearer_auth(access_token);
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(req.send().await?)
    }

    /// Single-flight refresh. The caller passes the access token its failed
    /// request used; if the store already holds a different one by the time
    /// the gate is acquired, another task refreshed first and that result is
    /// reused without a second network call.
    async fn refreshed_access_token(&self, stale: &str) -> Result<String, ClientError> {
        let _guard = self.refresh_gate.lock().await;

        let refresh_token = match self.store.load() {
            Some(pair) if pair.access_token != stale => return Ok(pair.access_token),
            Some(pair) => pair.refresh_token,
            None => return Err(ClientError::SessionExpired),
        };

        let resp = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        if !resp.status().is_success() {
            // Rejected refresh ends the session for every queued request.
            self.store.clear();
            return Err(ClientError::SessionExpired);
        }

        let auth: AuthResponse = resp.json().await?;
        self.persist(&auth);
        Ok(auth.access_token)
    }

    fn persist(&self, auth: &AuthResponse) {
        self.store.save(&TokenPair {
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone(),
        });
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn into_result<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    if resp.status().is_success() {
        Ok(resp.json().await?)
    } else {
        Err(error_from(resp).await)
    }
}

/// Pull the message out of the server's error envelope, falling back to the
/// status line when the body is not the expected shape.
async fn error_from(resp: Response) -> ClientError {
    let status = resp.status().as_u16();
    let message = match resp.json::<Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string(),
        Err(_) => "Unknown error".to_string(),
    };
    ClientError::Api { status, message }
}
