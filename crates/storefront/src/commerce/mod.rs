//! Identity-scoped cart/wishlist query layer.
//!
//! Presents cart, wishlist, and order history as cached collections backed
//! by the relational store, with mutations that invalidate and refetch.
//! Collections are cached per user with a TTL (`moka`); a successful write
//! invalidates the affected entry so the next read refetches. There is no
//! optimistic update: readers see the pre-write state until the refetch
//! resolves, and concurrent writers are last-writer-wins at the row level.

mod cache;
mod images;

pub mod backend;

pub use backend::{CartRow, CommerceBackend, NewOrder, OrderRow, ProductRow, WishlistRow};
pub use images::ImageResolver;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use orchard_core::{OrderId, ProductId, UserId};

use crate::db::RepositoryError;

use cache::{CacheKey, CacheValue};

/// Maximum cached collections across all users.
const CACHE_CAPACITY: u64 = 10_000;

/// Errors from commerce operations.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// A mutation was attempted with no resolvable identity. Never silently
    /// downgraded to an anonymous write.
    #[error("not logged in")]
    NotAuthenticated,

    /// Checkout was attempted on an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The data store rejected a read or write.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A catalog product, image-resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
}

/// One product's entry in a user's cart, joined and image-resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: Option<String>,
}

/// A product saved for later, joined and image-resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishlistEntry {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
}

/// A past order snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub items: serde_json::Value,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Cached, identity-scoped view over cart/wishlist/order records.
///
/// Cheaply cloneable; clones share the backend and cache.
#[derive(Clone)]
pub struct CommerceClient<B> {
    inner: Arc<CommerceClientInner<B>>,
}

struct CommerceClientInner<B> {
    backend: B,
    images: ImageResolver,
    cache: Cache<CacheKey, CacheValue>,
}

impl<B: CommerceBackend> CommerceClient<B> {
    /// Create a new client over `backend`.
    #[must_use]
    pub fn new(backend: B, images: ImageResolver, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(CommerceClientInner {
                backend,
                images,
                cache,
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The product catalog, image-resolved.
    ///
    /// Global rather than per-user; cached under one key and refreshed by
    /// TTL (the catalog only changes out of band, via seeding).
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the backend read fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, CommerceError> {
        let key = CacheKey::Catalog;
        if let Some(CacheValue::Catalog(products)) = self.inner.cache.get(&key).await {
            debug!("cache hit for catalog");
            return Ok(products);
        }

        let rows = self.inner.backend.product_rows().await?;
        let products: Vec<Product> = rows
            .into_iter()
            .map(|row| Product {
                image: self.inner.images.resolve(row.image_path.as_deref()),
                id: row.id,
                name: row.name,
                price: row.price,
            })
            .collect();

        self.inner
            .cache
            .insert(key, CacheValue::Catalog(products.clone()))
            .await;

        Ok(products)
    }

    /// The user's cart, joined with product data.
    ///
    /// No identity yields an empty cart, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the backend read fails.
    #[instrument(skip(self))]
    pub async fn cart(&self, identity: Option<UserId>) -> Result<Vec<CartLine>, CommerceError> {
        let Some(user) = identity else {
            return Ok(Vec::new());
        };

        let key = CacheKey::Cart(user);
        if let Some(CacheValue::Cart(lines)) = self.inner.cache.get(&key).await {
            debug!("cache hit for cart");
            return Ok(lines);
        }

        let rows = self.inner.backend.cart_rows(user).await?;
        let lines: Vec<CartLine> = rows
            .into_iter()
            .map(|row| CartLine {
                image: self.inner.images.resolve(row.image_path.as_deref()),
                id: row.product_id,
                name: row.name,
                price: row.price,
                quantity: u32::try_from(row.quantity).unwrap_or(0),
            })
            .collect();

        self.inner
            .cache
            .insert(key, CacheValue::Cart(lines.clone()))
            .await;

        Ok(lines)
    }

    /// Sum of cart line quantities (navigation badge).
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the backend read fails.
    pub async fn cart_count(&self, identity: Option<UserId>) -> Result<u32, CommerceError> {
        Ok(self.cart(identity).await?.iter().map(|l| l.quantity).sum())
    }

    /// The user's wishlist, joined with product data.
    ///
    /// No identity yields an empty wishlist, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the backend read fails.
    #[instrument(skip(self))]
    pub async fn wishlist(
        &self,
        identity: Option<UserId>,
    ) -> Result<Vec<WishlistEntry>, CommerceError> {
        let Some(user) = identity else {
            return Ok(Vec::new());
        };

        let key = CacheKey::Wishlist(user);
        if let Some(CacheValue::Wishlist(entries)) = self.inner.cache.get(&key).await {
            debug!("cache hit for wishlist");
            return Ok(entries);
        }

        let rows = self.inner.backend.wishlist_rows(user).await?;
        let entries: Vec<WishlistEntry> = rows
            .into_iter()
            .map(|row| WishlistEntry {
                image: self.inner.images.resolve(row.image_path.as_deref()),
                id: row.product_id,
                name: row.name,
                price: row.price,
            })
            .collect();

        self.inner
            .cache
            .insert(key, CacheValue::Wishlist(entries.clone()))
            .await;

        Ok(entries)
    }

    /// Number of wishlisted products (navigation badge).
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the backend read fails.
    pub async fn wishlist_count(&self, identity: Option<UserId>) -> Result<usize, CommerceError> {
        Ok(self.wishlist(identity).await?.len())
    }

    /// The user's order history, newest first.
    ///
    /// No identity yields an empty history, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if the backend read fails.
    #[instrument(skip(self))]
    pub async fn orders(&self, identity: Option<UserId>) -> Result<Vec<Order>, CommerceError> {
        let Some(user) = identity else {
            return Ok(Vec::new());
        };

        let key = CacheKey::Orders(user);
        if let Some(CacheValue::Orders(orders)) = self.inner.cache.get(&key).await {
            debug!("cache hit for orders");
            return Ok(orders);
        }

        let rows = self.inner.backend.order_rows(user).await?;
        let orders: Vec<Order> = rows
            .into_iter()
            .map(|row| Order {
                id: row.id,
                items: row.items,
                total: row.total,
                created_at: row.created_at,
            })
            .collect();

        self.inner
            .cache
            .insert(key, CacheValue::Orders(orders.clone()))
            .await;

        Ok(orders)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Set the cart quantity for a product.
    ///
    /// A quantity of zero or below deletes the row (deleting an absent row
    /// is a no-op); a positive quantity upserts, keyed on the
    /// `(user, product)` pair, so repeated calls overwrite rather than
    /// duplicate. On success the cached cart is invalidated.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotAuthenticated` when no identity is given,
    /// or `CommerceError::Repository` if the write fails.
    #[instrument(skip(self))]
    pub async fn set_cart_quantity(
        &self,
        identity: Option<UserId>,
        product: &ProductId,
        quantity: i32,
    ) -> Result<(), CommerceError> {
        let user = identity.ok_or(CommerceError::NotAuthenticated)?;

        match u32::try_from(quantity) {
            Ok(q) if q > 0 => self.inner.backend.upsert_cart_item(user, product, q).await?,
            _ => self.inner.backend.delete_cart_item(user, product).await?,
        }

        self.inner.cache.invalidate(&CacheKey::Cart(user)).await;
        Ok(())
    }

    /// Set wishlist membership for a product.
    ///
    /// Idempotent: setting an existing state again changes nothing. On
    /// success the cached wishlist is invalidated.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotAuthenticated` when no identity is given,
    /// or `CommerceError::Repository` if the write fails.
    #[instrument(skip(self))]
    pub async fn set_wishlisted(
        &self,
        identity: Option<UserId>,
        product: &ProductId,
        wanted: bool,
    ) -> Result<(), CommerceError> {
        let user = identity.ok_or(CommerceError::NotAuthenticated)?;

        if wanted {
            self.inner
                .backend
                .insert_wishlist_entry(user, product)
                .await?;
        } else {
            self.inner
                .backend
                .delete_wishlist_entry(user, product)
                .await?;
        }

        self.inner.cache.invalidate(&CacheKey::Wishlist(user)).await;
        Ok(())
    }

    /// Toggle wishlist membership and return the new state.
    ///
    /// Check-then-act over [`Self::set_wishlisted`]: two concurrent toggles
    /// for one product can race, and the next read reconciles. Callers that
    /// know the target state should call `set_wishlisted` directly.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotAuthenticated` when no identity is given,
    /// or `CommerceError::Repository` if a backend call fails.
    #[instrument(skip(self))]
    pub async fn toggle_wishlist(
        &self,
        identity: Option<UserId>,
        product: &ProductId,
    ) -> Result<bool, CommerceError> {
        let user = identity.ok_or(CommerceError::NotAuthenticated)?;

        let present = self.inner.backend.is_wishlisted(user, product).await?;
        self.set_wishlisted(Some(user), product, !present).await?;

        Ok(!present)
    }

    /// Snapshot the cart into an order and clear it (simulated checkout).
    ///
    /// On success the cached cart and order history are invalidated.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotAuthenticated` when no identity is given,
    /// `CommerceError::EmptyCart` when there is nothing to order, or
    /// `CommerceError::Repository` if a backend call fails.
    #[instrument(skip(self))]
    pub async fn place_order(&self, identity: Option<UserId>) -> Result<OrderId, CommerceError> {
        let user = identity.ok_or(CommerceError::NotAuthenticated)?;

        let lines = self.cart(Some(user)).await?;
        if lines.is_empty() {
            return Err(CommerceError::EmptyCart);
        }

        let total: Decimal = lines
            .iter()
            .map(|l| l.price * Decimal::from(l.quantity))
            .sum();
        let items = serde_json::to_value(&lines)
            .map_err(|e| RepositoryError::DataCorruption(format!("unserializable cart: {e}")))?;

        let order_id = self
            .inner
            .backend
            .insert_order(user, NewOrder { items, total })
            .await?;

        self.inner.cache.invalidate(&CacheKey::Cart(user)).await;
        self.inner.cache.invalidate(&CacheKey::Orders(user)).await;

        Ok(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use crate::db::memory::MemoryBackend;

    fn client() -> CommerceClient<MemoryBackend> {
        let backend = MemoryBackend::new();
        backend.seed_product("m1", "Walnut Desk", Decimal::from(120), Some("m1.jpg"));
        backend.seed_product("m2", "Oak Shelf", Decimal::from(45), None);
        backend.seed_product("w3", "Brass Lamp", Decimal::from(80), Some("w3.jpg"));

        let images = ImageResolver::new(&MediaConfig {
            public_base_url: "https://media.orchard.test".to_string(),
            bucket: "products".to_string(),
        })
        .expect("valid media config");

        CommerceClient::new(backend, images, Duration::from_secs(300))
    }

    fn user() -> UserId {
        UserId::generate()
    }

    #[tokio::test]
    async fn unauthenticated_reads_are_empty_not_errors() {
        let client = client();
        assert!(client.cart(None).await.expect("no error").is_empty());
        assert!(client.wishlist(None).await.expect("no error").is_empty());
        assert!(client.orders(None).await.expect("no error").is_empty());
        assert_eq!(client.cart_count(None).await.expect("no error"), 0);
    }

    #[tokio::test]
    async fn unauthenticated_writes_fail_fast() {
        let client = client();
        let product = ProductId::new("m1");

        let err = client
            .set_cart_quantity(None, &product, 1)
            .await
            .expect_err("must not write anonymously");
        assert!(matches!(err, CommerceError::NotAuthenticated));

        let err = client
            .toggle_wishlist(None, &product)
            .await
            .expect_err("must not write anonymously");
        assert!(matches!(err, CommerceError::NotAuthenticated));
    }

    #[tokio::test]
    async fn unknown_product_writes_surface_as_conflicts() {
        let client = client();
        let err = client
            .set_cart_quantity(Some(user()), &ProductId::new("ghost"), 1)
            .await
            .expect_err("unknown product");
        assert!(matches!(
            err,
            CommerceError::Repository(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn set_quantity_upserts_then_deletes() {
        let client = client();
        let user = user();
        let product = ProductId::new("m1");

        client
            .set_cart_quantity(Some(user), &product, 1)
            .await
            .expect("upsert");
        let cart = client.cart(Some(user)).await.expect("read");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.first().map(|l| l.quantity), Some(1));

        client
            .set_cart_quantity(Some(user), &product, 3)
            .await
            .expect("overwrite");
        let cart = client.cart(Some(user)).await.expect("read");
        assert_eq!(cart.len(), 1, "no duplicate line");
        assert_eq!(cart.first().map(|l| l.quantity), Some(3));

        client
            .set_cart_quantity(Some(user), &product, 0)
            .await
            .expect("delete");
        assert!(client.cart(Some(user)).await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn negative_quantity_deletes_and_absent_delete_is_noop() {
        let client = client();
        let user = user();
        let product = ProductId::new("m2");

        // Deleting a row that was never there must not error.
        client
            .set_cart_quantity(Some(user), &product, -1)
            .await
            .expect("no-op delete");

        client
            .set_cart_quantity(Some(user), &product, 2)
            .await
            .expect("upsert");
        client
            .set_cart_quantity(Some(user), &product, -5)
            .await
            .expect("delete");
        assert!(client.cart(Some(user)).await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn last_write_wins_across_a_sequence() {
        let client = client();
        let user = user();
        let product = ProductId::new("m1");

        for quantity in [2, 7, 4] {
            client
                .set_cart_quantity(Some(user), &product, quantity)
                .await
                .expect("write");
        }

        let cart = client.cart(Some(user)).await.expect("read");
        assert_eq!(cart.first().map(|l| l.quantity), Some(4));
    }

    #[tokio::test]
    async fn products_list_catalog_with_resolved_images() {
        let client = client();

        let products = client.products().await.expect("read");
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "w3"], "ordered by handle");

        let first = products.first().expect("m1");
        assert_eq!(first.name, "Walnut Desk");
        assert_eq!(first.price, Decimal::from(120));
        assert_eq!(
            first.image.as_deref(),
            Some("https://media.orchard.test/products/m1.jpg")
        );
        assert_eq!(
            products.get(1).and_then(|p| p.image.clone()),
            None,
            "products without an image stay imageless"
        );
    }

    #[tokio::test]
    async fn catalog_reads_are_cached() {
        let client = client();
        assert_eq!(client.products().await.expect("read").len(), 3);

        // Seeding bypasses the client, so the cached catalog stays visible
        // until the TTL expires.
        client
            .inner
            .backend
            .seed_product("x9", "Teak Stool", Decimal::from(30), None);
        assert_eq!(client.products().await.expect("read").len(), 3);
    }

    #[tokio::test]
    async fn cart_joins_product_data_and_resolves_images() {
        let client = client();
        let user = user();

        client
            .set_cart_quantity(Some(user), &ProductId::new("m1"), 2)
            .await
            .expect("write");

        let cart = client.cart(Some(user)).await.expect("read");
        let line = cart.first().expect("one line");
        assert_eq!(line.name, "Walnut Desk");
        assert_eq!(line.price, Decimal::from(120));
        assert_eq!(
            line.image.as_deref(),
            Some("https://media.orchard.test/products/m1.jpg")
        );
    }

    #[tokio::test]
    async fn cart_count_sums_quantities() {
        let client = client();
        let user = user();

        client
            .set_cart_quantity(Some(user), &ProductId::new("m1"), 2)
            .await
            .expect("write");
        client
            .set_cart_quantity(Some(user), &ProductId::new("m2"), 3)
            .await
            .expect("write");

        assert_eq!(client.cart_count(Some(user)).await.expect("count"), 5);
    }

    #[tokio::test]
    async fn toggle_pair_restores_wishlist() {
        let client = client();
        let user = user();
        let product = ProductId::new("w3");

        assert!(client
            .toggle_wishlist(Some(user), &product)
            .await
            .expect("toggle on"));
        let wishlist = client.wishlist(Some(user)).await.expect("read");
        assert_eq!(wishlist.len(), 1);
        assert_eq!(wishlist.first().map(|e| e.id.clone()), Some(product.clone()));

        assert!(!client
            .toggle_wishlist(Some(user), &product)
            .await
            .expect("toggle off"));
        assert!(client.wishlist(Some(user)).await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn set_wishlisted_is_idempotent() {
        let client = client();
        let user = user();
        let product = ProductId::new("w3");

        client
            .set_wishlisted(Some(user), &product, true)
            .await
            .expect("set");
        client
            .set_wishlisted(Some(user), &product, true)
            .await
            .expect("set again");
        assert_eq!(client.wishlist_count(Some(user)).await.expect("count"), 1);

        client
            .set_wishlisted(Some(user), &product, false)
            .await
            .expect("unset");
        client
            .set_wishlisted(Some(user), &product, false)
            .await
            .expect("unset again");
        assert_eq!(client.wishlist_count(Some(user)).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn mutation_invalidates_cached_cart() {
        let client = client();
        let user = user();
        let product = ProductId::new("m1");

        client
            .set_cart_quantity(Some(user), &product, 1)
            .await
            .expect("write");
        // Prime the cache.
        assert_eq!(client.cart_count(Some(user)).await.expect("count"), 1);

        client
            .set_cart_quantity(Some(user), &product, 3)
            .await
            .expect("write");
        // Next read must reflect the mutation, not the cached view.
        assert_eq!(client.cart_count(Some(user)).await.expect("count"), 3);
    }

    #[tokio::test]
    async fn out_of_band_writes_stay_invisible_until_invalidation() {
        let client = client();
        let user = user();
        let product = ProductId::new("m1");

        client
            .set_cart_quantity(Some(user), &product, 1)
            .await
            .expect("write");
        assert_eq!(client.cart_count(Some(user)).await.expect("count"), 1);

        // A write that bypasses the client does not invalidate: the cached
        // view stays visible. This is the documented invalidate-and-refetch
        // contract, not a bug.
        client
            .inner
            .backend
            .upsert_cart_item(user, &product, 9)
            .await
            .expect("backend write");
        assert_eq!(client.cart_count(Some(user)).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn identities_are_isolated() {
        let client = client();
        let alice = user();
        let bob = user();

        client
            .set_cart_quantity(Some(alice), &ProductId::new("m1"), 2)
            .await
            .expect("write");

        assert_eq!(client.cart_count(Some(alice)).await.expect("count"), 2);
        assert_eq!(client.cart_count(Some(bob)).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn place_order_snapshots_and_clears_cart() {
        let client = client();
        let user = user();

        client
            .set_cart_quantity(Some(user), &ProductId::new("m1"), 2)
            .await
            .expect("write");
        client
            .set_cart_quantity(Some(user), &ProductId::new("m2"), 1)
            .await
            .expect("write");

        let order_id = client.place_order(Some(user)).await.expect("checkout");

        assert!(client.cart(Some(user)).await.expect("read").is_empty());

        let orders = client.orders(Some(user)).await.expect("history");
        assert_eq!(orders.len(), 1);
        let order = orders.first().expect("one order");
        assert_eq!(order.id, order_id);
        assert_eq!(order.total, Decimal::from(285));
    }

    #[tokio::test]
    async fn empty_cart_checkout_is_rejected() {
        let client = client();
        let err = client
            .place_order(Some(user()))
            .await
            .expect_err("nothing to order");
        assert!(matches!(err, CommerceError::EmptyCart));
    }

    #[tokio::test]
    async fn orders_are_newest_first() {
        let client = client();
        let user = user();

        for quantity in [1, 2] {
            client
                .set_cart_quantity(Some(user), &ProductId::new("m1"), quantity)
                .await
                .expect("write");
            client.place_order(Some(user)).await.expect("checkout");
        }

        let orders = client.orders(Some(user)).await.expect("history");
        assert_eq!(orders.len(), 2);
        let (first, second) = (
            orders.first().expect("first"),
            orders.get(1).expect("second"),
        );
        assert!(first.created_at >= second.created_at);
        assert_eq!(first.total, Decimal::from(240));
    }
}
