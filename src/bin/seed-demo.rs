//! Seed a demo catalog and an admin account for local development.
//!
//! Usage: DATABASE_URL=... JWT_SECRET=x JWT_REFRESH_SECRET=x cargo run --bin seed-demo

use storefront_api::config::Config;
use storefront_api::db;
use storefront_api::models::category::CreateCategoryRequest;
use storefront_api::models::product::CreateProductRequest;
use storefront_api::models::user::{RegisterRequest, UserRole};
use storefront_api::services::auth::AuthService;
use storefront_api::services::categories::CategoryService;
use storefront_api::services::products::ProductService;
use storefront_api::services::tokens::TokenIssuer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let tokens = TokenIssuer::new(&config);

    let admin = RegisterRequest {
        email: "admin@storefront.local".into(),
        password: "admin-password".into(),
        first_name: "Admin".into(),
        last_name: "User".into(),
        role: Some(UserRole::Admin),
    };
    match AuthService::register(&pool, &tokens, &admin).await {
        Ok(resp) => info!("Created admin account {}", resp.user.email),
        Err(_) => info!("Admin account already present, skipping"),
    }

    let apparel = match db::categories::find_by_slug(&pool, "apparel").await? {
        Some(existing) => existing,
        None => {
            CategoryService::create(
                &pool,
                &CreateCategoryRequest {
                    name: "Apparel".into(),
                    slug: "apparel".into(),
                    image: None,
                    parent_id: None,
                },
            )
            .await?
        }
    };

    let shirts = match db::categories::find_by_slug(&pool, "shirts").await? {
        Some(existing) => existing,
        None => {
            CategoryService::create(
                &pool,
                &CreateCategoryRequest {
                    name: "Shirts".into(),
                    slug: "shirts".into(),
                    image: None,
                    parent_id: Some(apparel.id),
                },
            )
            .await?
        }
    };

    let demo_products = [
        ("Classic Tee", "classic-tee", 19.99, true),
        ("Oxford Shirt", "oxford-shirt", 49.99, false),
        ("Linen Shirt", "linen-shirt", 59.99, true),
    ];

    for (name, slug, price, featured) in demo_products {
        if db::products::find_by_slug(&pool, slug).await?.is_some() {
            info!("Product {slug} already present, skipping");
            continue;
        }
        ProductService::create(
            &pool,
            &CreateProductRequest {
                name: name.into(),
                slug: slug.into(),
                description: Some(format!("{name} from the demo catalog")),
                base_price: price,
                wholesale_price: Some(price * 0.7),
                wholesale_min: Some(10),
                images: vec![format!("/images/{slug}.jpg")],
                category_id: shirts.id,
                featured: Some(featured),
                active: Some(true),
            },
        )
        .await?;
        info!("Seeded product {slug}");
    }

    info!("Demo data seeded");
    Ok(())
}
