//! Session-lifecycle properties: register/login round trip, refresh-token
//! rotation, logout revocation, duplicate-email conflict.
//!
//! These need a real Postgres instance; set TEST_DATABASE_URL to run them,
//! otherwise each test skips itself.

use sqlx::PgPool;
use uuid::Uuid;

use storefront_api::config::Config;
use storefront_api::db;
use storefront_api::errors::ApiError;
use storefront_api::models::user::{LoginRequest, RegisterRequest, UserRole};
use storefront_api::services::auth::AuthService;
use storefront_api::services::tokens::TokenIssuer;

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = db::create_pool(&url).await.ok()?;
    db::run_migrations(&pool).await.ok()?;
    Some(pool)
}

fn issuer() -> TokenIssuer {
    TokenIssuer::new(&Config {
        database_url: "postgres://unused".into(),
        jwt_secret: "test-access-secret".into(),
        jwt_refresh_secret: "test-refresh-secret".into(),
        jwt_expiry_seconds: 900,
        jwt_refresh_expiry_days: 7,
        host: "127.0.0.1".into(),
        port: 0,
        frontend_origin: "http://localhost:3000".into(),
    })
}

fn unique_register(password: &str) -> RegisterRequest {
    RegisterRequest {
        email: format!("user-{}@example.com", Uuid::new_v4()),
        password: password.into(),
        first_name: "A".into(),
        last_name: "B".into(),
        role: None,
    }
}

#[tokio::test]
async fn login_immediately_after_register_succeeds_with_fresh_tokens() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let tokens = issuer();
    let req = unique_register("pw123456");

    let registered = AuthService::register(&pool, &tokens, &req).await.unwrap();
    assert_eq!(registered.user.email, req.email);
    assert_eq!(registered.user.role, UserRole::Customer);

    let wrong = AuthService::login(
        &pool,
        &tokens,
        &LoginRequest {
            email: req.email.clone(),
            password: "wrong".into(),
        },
    )
    .await;
    assert!(matches!(wrong, Err(ApiError::Unauthorized(_))));

    let logged_in = AuthService::login(
        &pool,
        &tokens,
        &LoginRequest {
            email: req.email.clone(),
            password: req.password.clone(),
        },
    )
    .await
    .unwrap();

    assert_ne!(logged_in.access_token, registered.access_token);
    assert_ne!(logged_in.refresh_token, registered.refresh_token);
}

#[tokio::test]
async fn unknown_email_and_bad_password_yield_the_same_message() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let tokens = issuer();
    let req = unique_register("pw123456");
    AuthService::register(&pool, &tokens, &req).await.unwrap();

    let missing = AuthService::login(
        &pool,
        &tokens,
        &LoginRequest {
            email: format!("nobody-{}@example.com", Uuid::new_v4()),
            password: "pw123456".into(),
        },
    )
    .await
    .unwrap_err();
    let bad_password = AuthService::login(
        &pool,
        &tokens,
        &LoginRequest {
            email: req.email,
            password: "nope".into(),
        },
    )
    .await
    .unwrap_err();

    // Neither response may reveal whether the account exists.
    assert_eq!(missing.to_string(), bad_password.to_string());
}

#[tokio::test]
async fn refresh_rotation_makes_the_previous_token_unusable() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let tokens = issuer();
    let req = unique_register("pw123456");

    let first = AuthService::register(&pool, &tokens, &req).await.unwrap();

    let second = AuthService::refresh(&pool, &tokens, &first.refresh_token)
        .await
        .unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);

    // Replaying the rotated-away token must fail even though it has not
    // expired.
    let replay = AuthService::refresh(&pool, &tokens, &first.refresh_token).await;
    assert!(matches!(replay, Err(ApiError::Unauthorized(_))));

    // The latest token still works.
    AuthService::refresh(&pool, &tokens, &second.refresh_token)
        .await
        .unwrap();
}

#[tokio::test]
async fn refresh_after_logout_is_rejected_and_logout_is_idempotent() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let tokens = issuer();
    let req = unique_register("pw123456");

    let session = AuthService::register(&pool, &tokens, &req).await.unwrap();
    let user_id = session.user.id;

    AuthService::logout(&pool, user_id).await.unwrap();

    let refresh = AuthService::refresh(&pool, &tokens, &session.refresh_token).await;
    assert!(matches!(refresh, Err(ApiError::Unauthorized(_))));

    // A second logout with nothing stored still succeeds.
    AuthService::logout(&pool, user_id).await.unwrap();
}

#[tokio::test]
async fn duplicate_registration_conflicts_without_touching_the_first_account() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let tokens = issuer();
    let req = unique_register("pw123456");

    AuthService::register(&pool, &tokens, &req).await.unwrap();

    let duplicate = RegisterRequest {
        password: "other-password".into(),
        first_name: "X".into(),
        last_name: "Y".into(),
        role: Some(UserRole::Supplier),
        email: req.email.clone(),
    };
    let second = AuthService::register(&pool, &tokens, &duplicate).await;
    assert!(matches!(second, Err(ApiError::Conflict(_))));

    // The first registration's credentials are unaffected.
    AuthService::login(
        &pool,
        &tokens,
        &LoginRequest {
            email: req.email,
            password: req.password,
        },
    )
    .await
    .unwrap();
}
