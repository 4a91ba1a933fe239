use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_api::config::Config;
use storefront_api::middleware::auth::JwtSecret;
use storefront_api::services::tokens::TokenIssuer;
use storefront_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let tokens = Arc::new(TokenIssuer::new(&config));

    let state = AppState {
        db: pool,
        config: config.clone(),
        tokens,
    };

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(AllowOrigin::exact(config.frontend_origin.parse()?));

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/logout", post(routes::auth::logout))
        // Users
        .route(
            "/users/profile",
            get(routes::users::get_profile).patch(routes::users::update_profile),
        )
        .route(
            "/users/addresses",
            get(routes::users::list_addresses).post(routes::users::create_address),
        )
        .route(
            "/users/addresses/{id}",
            patch(routes::users::update_address).delete(routes::users::delete_address),
        )
        .route("/users", get(routes::users::list_users))
        .route("/users/{id}", get(routes::users::get_user))
        // Categories
        .route(
            "/categories",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route("/categories/{slug}", get(routes::categories::get_category))
        .route(
            "/categories/id/{id}",
            patch(routes::categories::update_category).delete(routes::categories::delete_category),
        )
        // Products
        .route(
            "/products",
            get(routes::products::list_products).post(routes::products::create_product),
        )
        .route("/products/{slug}", get(routes::products::get_product))
        .route(
            "/products/id/{id}",
            patch(routes::products::update_product).delete(routes::products::delete_product),
        )
        .route(
            "/products/id/{id}/variants",
            post(routes::products::create_variant),
        )
        .route(
            "/products/id/{id}/variants/{variant_id}",
            patch(routes::products::update_variant).delete(routes::products::delete_variant),
        )
        // Waitlist
        .route("/waitlist", post(routes::waitlist::join_waitlist))
        .route("/waitlist/count", get(routes::waitlist::waitlist_count))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("storefront API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
