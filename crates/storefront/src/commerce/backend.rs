//! Data-access seam for the commerce query layer.
//!
//! The query layer only ever touches cart/wishlist/order records through
//! [`CommerceBackend`]. Production uses [`crate::db::pg::PgBackend`]; tests
//! and local development use [`crate::db::memory::MemoryBackend`].

use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use orchard_core::{OrderId, ProductId, UserId};

use crate::db::RepositoryError;

/// A catalog product record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_path: Option<String>,
}

/// A cart row joined with its product record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CartRow {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_path: Option<String>,
    pub quantity: i32,
}

/// A wishlist row joined with its product record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WishlistRow {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_path: Option<String>,
}

/// A stored order snapshot.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: OrderId,
    pub items: serde_json::Value,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Input for an order snapshot.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Cart lines as they appeared at checkout, serialized.
    pub items: serde_json::Value,
    /// Order total at checkout.
    pub total: Decimal,
}

/// Storage operations backing the commerce query layer.
///
/// Every operation is scoped by the calling user's identity; uniqueness of
/// `(user, product)` per cart/wishlist is the backend's responsibility.
/// Deletes of absent rows are no-ops, not errors.
pub trait CommerceBackend: Send + Sync {
    /// The full product catalog, ordered by handle.
    fn product_rows(&self) -> impl Future<Output = Result<Vec<ProductRow>, RepositoryError>> + Send;

    /// All cart rows for `user`, joined with product data. Order follows
    /// storage return order.
    fn cart_rows(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<CartRow>, RepositoryError>> + Send;

    /// Insert or overwrite the cart row for `(user, product)`. `quantity`
    /// is always positive here; zero-quantity writes are handled as deletes
    /// by the caller.
    fn upsert_cart_item(
        &self,
        user: UserId,
        product: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete the cart row for `(user, product)` if present.
    fn delete_cart_item(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// All wishlist rows for `user`, joined with product data.
    fn wishlist_rows(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<WishlistRow>, RepositoryError>> + Send;

    /// Whether a wishlist row exists for `(user, product)`.
    fn is_wishlisted(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Insert the wishlist row for `(user, product)`; already-present rows
    /// are left alone.
    fn insert_wishlist_entry(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete the wishlist row for `(user, product)` if present.
    fn delete_wishlist_entry(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Order history for `user`, newest first.
    fn order_rows(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<OrderRow>, RepositoryError>> + Send;

    /// Store an order snapshot and clear the user's cart rows.
    fn insert_order(
        &self,
        user: UserId,
        order: NewOrder,
    ) -> impl Future<Output = Result<OrderId, RepositoryError>> + Send;
}
