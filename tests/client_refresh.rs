//! Refresh-interceptor behavior against an in-process mock auth server:
//! single-flight refresh under concurrency, retry-once, and session teardown
//! when the refresh token is rejected.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use storefront_api::client::store::{MemoryTokenStore, TokenStore};
use storefront_api::client::{ApiClient, ClientError};
use storefront_api::models::auth::TokenPair;
use storefront_api::models::user::UserDto;

struct MockAuthServer {
    refresh_calls: AtomicUsize,
    valid_access: Mutex<String>,
    refresh_succeeds: bool,
    profile_always_unauthorized: bool,
}

impl MockAuthServer {
    fn new(valid_access: &str) -> Arc<Self> {
        Self::with_behavior(valid_access, true, false)
    }

    fn with_behavior(
        valid_access: &str,
        refresh_succeeds: bool,
        profile_always_unauthorized: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            refresh_calls: AtomicUsize::new(0),
            valid_access: Mutex::new(valid_access.to_string()),
            refresh_succeeds,
            profile_always_unauthorized,
        })
    }
}

fn envelope(status: u16, message: &str) -> Value {
    json!({
        "statusCode": status,
        "message": message,
        "error": "Unauthorized",
        "timestamp": "2024-01-01T00:00:00Z",
    })
}

fn user_json() -> Value {
    json!({
        "id": "8c5c9e0a-1111-4222-8333-444455556666",
        "email": "a@x.com",
        "firstName": "A",
        "lastName": "B",
        "role": "CUSTOMER",
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z",
    })
}

async fn profile_handler(
    State(state): State<Arc<MockAuthServer>>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");
    let valid = state.valid_access.lock().unwrap().clone();

    if state.profile_always_unauthorized || bearer != valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(envelope(401, "Invalid or expired token")),
        ));
    }
    Ok(Json(user_json()))
}

async fn refresh_handler(
    State(state): State<Arc<MockAuthServer>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let call = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;

    // Widen the race window so concurrent 401 handlers really do queue
    // behind this call.
    tokio::time::sleep(Duration::from_millis(50)).await;

    if body.get("refreshToken").and_then(Value::as_str).is_none() {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(envelope(401, "Access denied")),
        ));
    }
    if !state.refresh_succeeds {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(envelope(401, "Access denied")),
        ));
    }

    let new_access = format!("access-{call}");
    *state.valid_access.lock().unwrap() = new_access.clone();

    Ok(Json(json!({
        "accessToken": new_access,
        "refreshToken": format!("refresh-{call}"),
        "user": user_json(),
    })))
}

async fn spawn_server(state: Arc<MockAuthServer>) -> SocketAddr {
    let app = Router::new()
        .route("/users/profile", get(profile_handler))
        .route("/auth/refresh", post(refresh_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn seeded_store(access: &str, refresh: &str) -> Arc<MemoryTokenStore> {
    let store = Arc::new(MemoryTokenStore::default());
    store.save(&TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    });
    store
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh_call() {
    let server = MockAuthServer::new("only-the-refreshed-token-works");
    let addr = spawn_server(server.clone()).await;

    let store = seeded_store("stale-access", "refresh-0");
    let client = Arc::new(ApiClient::new(
        format!("http://{addr}"),
        store.clone() as Arc<dyn TokenStore>,
    ));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.profile().await
        }));
    }

    for handle in handles {
        let user = handle.await.unwrap().expect("request should succeed after refresh");
        assert_eq!(user.email, "a@x.com");
    }

    assert_eq!(server.refresh_calls.load(Ordering::SeqCst), 1);
    // Every queued request retried with the same rotated pair.
    let pair = store.load().unwrap();
    assert_eq!(pair.access_token, "access-1");
    assert_eq!(pair.refresh_token, "refresh-1");
}

#[tokio::test]
async fn rejected_refresh_fails_all_queued_requests_and_clears_tokens() {
    let server = MockAuthServer::with_behavior("whatever", false, false);
    let addr = spawn_server(server.clone()).await;

    let store = seeded_store("stale-access", "refresh-0");
    let client = Arc::new(ApiClient::new(
        format!("http://{addr}"),
        store.clone() as Arc<dyn TokenStore>,
    ));

    let mut handles = Vec::new();
    for _ in 0..3 {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.profile().await }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ClientError::SessionExpired)));
    }

    assert_eq!(server.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(store.load().is_none());
}

#[tokio::test]
async fn a_retried_request_never_triggers_a_second_refresh() {
    let server = MockAuthServer::with_behavior("unreachable", true, true);
    let addr = spawn_server(server.clone()).await;

    let store = seeded_store("stale-access", "refresh-0");
    let client = ApiClient::new(format!("http://{addr}"), store as Arc<dyn TokenStore>);

    let result = client.profile().await;
    match result {
        Err(ClientError::Api { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected a surfaced 401, got {other:?}"),
    }

    // One refresh for the original failure, none for the failed retry.
    assert_eq!(server.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn valid_access_token_needs_no_refresh() {
    let server = MockAuthServer::new("good-access");
    let addr = spawn_server(server.clone()).await;

    let store = seeded_store("good-access", "refresh-0");
    let client = ApiClient::new(format!("http://{addr}"), store as Arc<dyn TokenStore>);

    let user = client.profile().await.expect("no refresh needed");
    assert_eq!(user.email, "a@x.com");
    assert_eq!(server.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unauthenticated_client_fails_without_touching_the_network() {
    let server = MockAuthServer::new("irrelevant");
    let addr = spawn_server(server.clone()).await;

    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::default());
    let client = ApiClient::new(format!("http://{addr}"), store);

    let result = client.profile().await;
    assert!(matches!(result, Err(ClientError::Unauthenticated)));
    assert_eq!(server.refresh_calls.load(Ordering::SeqCst), 0);
}
