//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "orchard_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The session cookie is signed with a key derived from the configured
/// session secret; configuration validation guarantees the secret meets the
/// 32-byte minimum `Key::derive_from` requires. The sessions table is
/// created by migrations, not here.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    let store = PostgresStore::new(pool.clone());

    let is_secure = config.base_url.starts_with("https://");
    let signing_key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_signed(signing_key)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::config::{MediaConfig, StorefrontConfig};

    fn test_config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            media: MediaConfig {
                public_base_url: "https://media.test".to_string(),
                bucket: "products".to_string(),
            },
            cache_ttl_secs: 300,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[tokio::test]
    async fn session_layer_derives_signing_key_from_secret() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/test")
            .unwrap();

        // Key::derive_from panics on secrets under 32 bytes; a secret at
        // the configured minimum must build the layer.
        let _layer = create_session_layer(&pool, &test_config("https://shop.test"));
        let _layer = create_session_layer(&pool, &test_config("http://localhost:3000"));
    }
}
