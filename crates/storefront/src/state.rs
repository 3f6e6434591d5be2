//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::commerce::{CommerceClient, ImageResolver};
use crate::config::StorefrontConfig;
use crate::db::pg::PgBackend;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("invalid media base URL: {0}")]
    InvalidMediaUrl(#[from] url::ParseError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    commerce: CommerceClient<PgBackend>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the media base URL in the configuration is invalid.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, AppStateError> {
        let images = ImageResolver::new(&config.media)?;
        let commerce = CommerceClient::new(
            PgBackend::new(pool.clone()),
            images,
            Duration::from_secs(config.cache_ttl_secs),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                commerce,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the commerce query layer.
    #[must_use]
    pub fn commerce(&self) -> &CommerceClient<PgBackend> {
        &self.inner.commerce
    }
}
