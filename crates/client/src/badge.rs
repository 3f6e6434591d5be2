//! Badge/count consumers for the local store.
//!
//! A badge never assumes counts are available synchronously: it starts at
//! zero and re-derives by re-reading the store whenever the change hub
//! signals, rather than trusting any payload on the signal itself.

use tokio::sync::broadcast::{self, error::RecvError};

use crate::cart::GuestCart;
use crate::notify::StoreChange;
use crate::store::LocalStore;

/// Counts displayed by navigation badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BadgeCounts {
    /// Sum of cart line quantities.
    pub cart: u32,
    /// Number of wishlisted products.
    pub wishlist: usize,
}

/// A count consumer bound to one store.
///
/// Holds a subscription taken at construction, so writes made while the
/// consumer is between polls are still observed (possibly coalesced).
#[derive(Debug)]
pub struct BadgeWatcher {
    cart: GuestCart,
    rx: broadcast::Receiver<StoreChange>,
}

impl BadgeWatcher {
    /// Attach a watcher to a store.
    #[must_use]
    pub fn new(store: &LocalStore) -> Self {
        Self {
            cart: GuestCart::new(store.clone()),
            rx: store.subscribe(),
        }
    }

    /// Current counts, re-derived from the store.
    #[must_use]
    pub fn counts(&self) -> BadgeCounts {
        BadgeCounts {
            cart: self.cart.cart_count(),
            wishlist: self.cart.wishlist_count(),
        }
    }

    /// Wait for the next change signal, then re-derive counts.
    ///
    /// A lagged subscription is treated as a plain change: signals are
    /// level-triggered hints, so skipping ahead and re-reading is correct.
    /// Returns `None` once the store (and its hub) is gone.
    pub async fn next_counts(&mut self) -> Option<BadgeCounts> {
        match self.rx.recv().await {
            Ok(_) | Err(RecvError::Lagged(_)) => Some(self.counts()),
            Err(RecvError::Closed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use orchard_core::ProductId;

    use super::*;
    use crate::cart::GuestCartLine;

    fn line(id: &str, quantity: u32) -> GuestCartLine {
        GuestCartLine {
            id: ProductId::new(id),
            name: id.to_owned(),
            image: None,
            price: Decimal::from(10),
            discount: None,
            quantity,
        }
    }

    #[test]
    fn fresh_badge_defaults_to_zero() {
        let store = LocalStore::in_memory();
        let watcher = BadgeWatcher::new(&store);
        assert_eq!(watcher.counts(), BadgeCounts::default());
    }

    #[tokio::test]
    async fn badge_converges_after_write_from_another_handle() {
        let store = LocalStore::in_memory();
        let mut watcher = BadgeWatcher::new(&store);

        // A different handle on the same store writes a cart.
        let writer = GuestCart::new(store.clone());
        writer.add_line(line("a1", 2));

        let counts = watcher.next_counts().await.expect("signal delivered");
        assert_eq!(counts.cart, 2);
    }

    #[tokio::test]
    async fn badge_tracks_wishlist_changes() {
        let store = LocalStore::in_memory();
        let mut watcher = BadgeWatcher::new(&store);

        let writer = GuestCart::new(store.clone());
        writer.toggle_wishlist(&ProductId::new("w3"));

        let counts = watcher.next_counts().await.expect("signal delivered");
        assert_eq!(counts.wishlist, 1);

        writer.toggle_wishlist(&ProductId::new("w3"));
        let counts = watcher.next_counts().await.expect("signal delivered");
        assert_eq!(counts.wishlist, 0);
    }
}
