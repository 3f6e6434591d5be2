//! In-process commerce backend.
//!
//! Mirrors the relational schema's constraints (unique `(user, product)`
//! rows, product foreign keys) without a database. Used by the test suite
//! and by local development where no Postgres is available.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rust_decimal::Decimal;

use orchard_core::{OrderId, ProductId, UserId};

use crate::commerce::backend::{
    CartRow, CommerceBackend, NewOrder, OrderRow, ProductRow, WishlistRow,
};

use super::RepositoryError;

#[derive(Debug, Clone)]
struct ProductRecord {
    name: String,
    price: Decimal,
    image_path: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, ProductRecord>,
    /// Per-user cart items in insertion order; at most one per product.
    carts: HashMap<UserId, Vec<(ProductId, u32)>>,
    /// Per-user wishlist in insertion order; set semantics.
    wishlists: HashMap<UserId, Vec<ProductId>>,
    /// Per-user orders in chronological order.
    orders: HashMap<UserId, Vec<OrderRow>>,
}

/// In-memory [`CommerceBackend`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a catalog product (join target for cart/wishlist rows).
    pub fn seed_product(
        &self,
        id: impl Into<ProductId>,
        name: &str,
        price: Decimal,
        image_path: Option<&str>,
    ) {
        let mut state = self.lock();
        state.products.insert(
            id.into(),
            ProductRecord {
                name: name.to_owned(),
                price,
                image_path: image_path.map(str::to_owned),
            },
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock means a panicked test thread; propagating the
        // panic is the right behavior there.
        #[allow(clippy::unwrap_used)]
        self.state.lock().unwrap()
    }

    fn require_product(state: &State, product: &ProductId) -> Result<(), RepositoryError> {
        if state.products.contains_key(product) {
            Ok(())
        } else {
            Err(RepositoryError::Conflict(format!(
                "unknown product: {product}"
            )))
        }
    }
}

impl CommerceBackend for MemoryBackend {
    async fn product_rows(&self) -> Result<Vec<ProductRow>, RepositoryError> {
        let state = self.lock();
        let mut rows: Vec<ProductRow> = state
            .products
            .iter()
            .map(|(id, record)| ProductRow {
                id: id.clone(),
                name: record.name.clone(),
                price: record.price,
                image_path: record.image_path.clone(),
            })
            .collect();
        // Handle order, matching the relational backend.
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn cart_rows(&self, user: UserId) -> Result<Vec<CartRow>, RepositoryError> {
        let state = self.lock();
        let rows = state
            .carts
            .get(&user)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|(product, quantity)| {
                        state.products.get(product).map(|record| CartRow {
                            product_id: product.clone(),
                            name: record.name.clone(),
                            price: record.price,
                            image_path: record.image_path.clone(),
                            quantity: i32::try_from(*quantity).unwrap_or(i32::MAX),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn upsert_cart_item(
        &self,
        user: UserId,
        product: &ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        Self::require_product(&state, product)?;

        let items = state.carts.entry(user).or_default();
        if let Some(item) = items.iter_mut().find(|(p, _)| p == product) {
            item.1 = quantity;
        } else {
            items.push((product.clone(), quantity));
        }
        Ok(())
    }

    async fn delete_cart_item(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if let Some(items) = state.carts.get_mut(&user) {
            items.retain(|(p, _)| p != product);
        }
        Ok(())
    }

    async fn wishlist_rows(&self, user: UserId) -> Result<Vec<WishlistRow>, RepositoryError> {
        let state = self.lock();
        let rows = state
            .wishlists
            .get(&user)
            .map(|products| {
                products
                    .iter()
                    .filter_map(|product| {
                        state.products.get(product).map(|record| WishlistRow {
                            product_id: product.clone(),
                            name: record.name.clone(),
                            price: record.price,
                            image_path: record.image_path.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn is_wishlisted(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> Result<bool, RepositoryError> {
        let state = self.lock();
        Ok(state
            .wishlists
            .get(&user)
            .is_some_and(|products| products.contains(product)))
    }

    async fn insert_wishlist_entry(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        Self::require_product(&state, product)?;

        let products = state.wishlists.entry(user).or_default();
        if !products.contains(product) {
            products.push(product.clone());
        }
        Ok(())
    }

    async fn delete_wishlist_entry(
        &self,
        user: UserId,
        product: &ProductId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if let Some(products) = state.wishlists.get_mut(&user) {
            products.retain(|p| p != product);
        }
        Ok(())
    }

    async fn order_rows(&self, user: UserId) -> Result<Vec<OrderRow>, RepositoryError> {
        let state = self.lock();
        let mut rows = state.orders.get(&user).cloned().unwrap_or_default();
        rows.reverse();
        Ok(rows)
    }

    async fn insert_order(
        &self,
        user: UserId,
        order: NewOrder,
    ) -> Result<OrderId, RepositoryError> {
        let mut state = self.lock();
        let id = OrderId::generate();
        state.orders.entry(user).or_default().push(OrderRow {
            id,
            items: order.items,
            total: order.total,
            created_at: Utc::now(),
        });
        state.carts.remove(&user);
        Ok(id)
    }
}
