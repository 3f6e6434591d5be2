//! Typed cart and wishlist operations over the local store.
//!
//! The cart is a list of [`GuestCartLine`]s under the `"cart"` key; the
//! wishlist is an ordered, deduplicated list of product IDs under
//! `"wishlist"`. Every mutation is a read-modify-write of the whole value:
//! last writer wins, no version check, matching the remote layer's row-level
//! behavior.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::ProductId;

use crate::store::LocalStore;

/// Store key holding the cart lines.
pub const CART_KEY: &str = "cart";

/// Store key holding the wishlist product IDs.
pub const WISHLIST_KEY: &str = "wishlist";

/// One product's entry in the guest cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestCartLine {
    /// Product handle.
    pub id: ProductId,
    /// Display name, denormalized at add time.
    pub name: String,
    /// Image URL, if the product had one when added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price at add time.
    pub price: Decimal,
    /// Percentage discount at add time, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    /// Units of this product. Never zero in a stored cart; a quantity that
    /// reaches zero removes the line.
    pub quantity: u32,
}

/// Guest cart and wishlist over a [`LocalStore`].
#[derive(Debug, Clone)]
pub struct GuestCart {
    store: LocalStore,
}

impl GuestCart {
    /// Wrap a local store.
    #[must_use]
    pub const fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Access the underlying store (for subscriptions).
    #[must_use]
    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Current cart lines.
    #[must_use]
    pub fn lines(&self) -> Vec<GuestCartLine> {
        self.store.read(CART_KEY, Vec::new())
    }

    /// Add a line to the cart.
    ///
    /// If the product is already present its quantity is increased by the
    /// incoming line's quantity; the cart never holds duplicate lines for
    /// one product. A line with quantity 0 is ignored.
    pub fn add_line(&self, line: GuestCartLine) {
        if line.quantity == 0 {
            return;
        }

        let mut lines = self.lines();
        if let Some(existing) = lines.iter_mut().find(|l| l.id == line.id) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            lines.push(line);
        }
        self.store.write(CART_KEY, &lines);
    }

    /// Set the quantity for a product already in the cart.
    ///
    /// Quantity 0 removes the line. Setting a quantity for a product that is
    /// not in the cart is a no-op (use [`Self::add_line`] to introduce one).
    pub fn set_quantity(&self, product: &ProductId, quantity: u32) {
        let mut lines = self.lines();
        if quantity == 0 {
            let before = lines.len();
            lines.retain(|l| &l.id != product);
            if lines.len() == before {
                return;
            }
        } else {
            let Some(line) = lines.iter_mut().find(|l| &l.id == product) else {
                return;
            };
            line.quantity = quantity;
        }
        self.store.write(CART_KEY, &lines);
    }

    /// Remove a product from the cart.
    pub fn remove_line(&self, product: &ProductId) {
        self.set_quantity(product, 0);
    }

    /// Drop the whole cart (e.g. after a simulated checkout).
    pub fn clear(&self) {
        self.store.write(CART_KEY, &Vec::<GuestCartLine>::new());
    }

    /// Total units in the cart (sum of line quantities).
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.lines().iter().map(|l| l.quantity).sum()
    }

    /// Current wishlist, in insertion order.
    #[must_use]
    pub fn wishlist(&self) -> Vec<ProductId> {
        self.store.read(WISHLIST_KEY, Vec::new())
    }

    /// Toggle wishlist membership for a product.
    ///
    /// Returns the new membership state. The wishlist is a set: toggling on
    /// an already-present product removes it, and duplicates never appear.
    pub fn toggle_wishlist(&self, product: &ProductId) -> bool {
        let mut wishlist = self.wishlist();
        let wanted = if wishlist.contains(product) {
            wishlist.retain(|p| p != product);
            false
        } else {
            wishlist.push(product.clone());
            true
        };
        self.store.write(WISHLIST_KEY, &wishlist);
        wanted
    }

    /// Whether a product is wishlisted.
    #[must_use]
    pub fn is_wishlisted(&self, product: &ProductId) -> bool {
        self.wishlist().contains(product)
    }

    /// Number of wishlisted products.
    #[must_use]
    pub fn wishlist_count(&self) -> usize {
        self.wishlist().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: u32) -> GuestCartLine {
        GuestCartLine {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            image: None,
            price: Decimal::from(120),
            discount: Some(Decimal::from(20)),
            quantity,
        }
    }

    fn cart() -> GuestCart {
        GuestCart::new(LocalStore::in_memory())
    }

    #[test]
    fn add_aggregates_repeat_products() {
        let cart = cart();
        cart.add_line(line("m1", 1));
        cart.add_line(line("m1", 2));

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().map(|l| l.quantity), Some(3));
    }

    #[test]
    fn set_quantity_zero_removes_line() {
        let cart = cart();
        cart.add_line(line("m1", 2));
        cart.set_quantity(&ProductId::new("m1"), 0);

        assert!(cart.lines().is_empty());
    }

    #[test]
    fn set_quantity_overwrites_in_place() {
        let cart = cart();
        cart.add_line(line("m1", 1));
        cart.set_quantity(&ProductId::new("m1"), 3);

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().map(|l| l.quantity), Some(3));
    }

    #[test]
    fn set_quantity_for_absent_product_is_noop() {
        let cart = cart();
        cart.set_quantity(&ProductId::new("ghost"), 5);
        assert!(cart.lines().is_empty());
    }

    #[test]
    fn zero_quantity_add_is_ignored() {
        let cart = cart();
        cart.add_line(line("m1", 0));
        assert!(cart.lines().is_empty());
    }

    #[test]
    fn cart_count_sums_quantities() {
        let cart = cart();
        cart.add_line(line("m1", 2));
        cart.add_line(line("m2", 3));
        assert_eq!(cart.cart_count(), 5);
    }

    #[test]
    fn wishlist_toggle_pair_restores_state() {
        let cart = cart();
        let product = ProductId::new("w3");

        assert!(cart.toggle_wishlist(&product));
        assert!(cart.is_wishlisted(&product));

        assert!(!cart.toggle_wishlist(&product));
        assert!(!cart.is_wishlisted(&product));
        assert_eq!(cart.wishlist_count(), 0);
    }

    #[test]
    fn wishlist_never_duplicates() {
        let cart = cart();
        let product = ProductId::new("w3");

        cart.toggle_wishlist(&product);
        cart.toggle_wishlist(&product);
        cart.toggle_wishlist(&product);

        assert_eq!(cart.wishlist(), vec![product]);
    }

    #[test]
    fn clear_empties_cart() {
        let cart = cart();
        cart.add_line(line("m1", 4));
        cart.clear();
        assert_eq!(cart.cart_count(), 0);
    }
}
