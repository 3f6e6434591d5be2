//! Seed the product catalog with demo data.
//!
//! Inserts a small fixed set of products keyed by string handles. Re-running
//! the command updates names and prices in place rather than duplicating.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::info;

use orchard_core::Price;

/// Demo catalog: (handle, name, price in cents, image path).
const DEMO_PRODUCTS: &[(&str, &str, i64, Option<&str>)] = &[
    ("m1", "Walnut Desk", 12_000, Some("m1.jpg")),
    ("m2", "Oak Shelf", 4_500, Some("m2.jpg")),
    ("m3", "Linen Armchair", 28_000, Some("m3.jpg")),
    ("w1", "Brass Lamp", 8_000, Some("w1.jpg")),
    ("w2", "Ceramic Vase", 3_200, None),
];

/// Seed the products table.
///
/// # Errors
///
/// Returns an error if the database URL is missing or an insert fails.
pub async fn products() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ORCHARD_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "ORCHARD_DATABASE_URL not set")?;

    let pool = PgPool::connect(database_url.expose_secret()).await?;
    info!("Connected to database");

    for (handle, name, cents, image_path) in DEMO_PRODUCTS {
        let price = Price::from_cents(*cents);
        sqlx::query(
            r"
            INSERT INTO products (id, name, price, image_path)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET name = EXCLUDED.name,
                          price = EXCLUDED.price,
                          image_path = EXCLUDED.image_path
            ",
        )
        .bind(handle)
        .bind(name)
        .bind(price.amount)
        .bind(image_path)
        .execute(&pool)
        .await?;

        info!(product = handle, price = %price.display(), "Seeded");
    }

    info!("Seeding complete: {} products", DEMO_PRODUCTS.len());
    Ok(())
}
