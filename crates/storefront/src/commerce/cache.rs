//! Cache types for commerce query responses.

use orchard_core::UserId;

use super::{CartLine, Order, Product, WishlistEntry};

/// Cache key for commerce collections.
///
/// Cart, wishlist, and order views are per-user; the catalog is global.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Catalog,
    Cart(UserId),
    Wishlist(UserId),
    Orders(UserId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Catalog(Vec<Product>),
    Cart(Vec<CartLine>),
    Wishlist(Vec<WishlistEntry>),
    Orders(Vec<Order>),
}
