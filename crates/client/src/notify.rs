//! Broadcast change hub for store updates.
//!
//! Writers send a [`StoreChange`] after a successful write; listeners treat
//! delivery as a level-triggered "re-sync now" hint and re-read the store.
//! The signal intentionally carries no value payload: a lagged receiver may
//! see changes coalesced, so the only safe reaction is a fresh read.

use tokio::sync::broadcast;

/// Default channel capacity. Lagging past this coalesces signals, which is
/// fine for a re-sync hint.
const CHANNEL_CAPACITY: usize = 64;

/// Notification that the value under `key` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    /// Store key whose value changed (e.g. `"cart"`).
    pub key: String,
}

/// Fan-out hub for store change notifications.
///
/// Cloning the hub shares the underlying channel; receivers deregister by
/// being dropped.
#[derive(Debug, Clone)]
pub struct ChangeHub {
    tx: broadcast::Sender<StoreChange>,
}

impl ChangeHub {
    /// Create a new hub.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to change notifications.
    ///
    /// Only changes sent after this call are observed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.tx.subscribe()
    }

    /// Notify all subscribers that `key` changed.
    ///
    /// A send with no live receivers is not an error; the hub is best-effort
    /// by contract.
    pub fn notify(&self, key: &str) {
        let _ = self.tx.send(StoreChange {
            key: key.to_owned(),
        });
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_change_to_subscriber() {
        let hub = ChangeHub::new();
        let mut rx = hub.subscribe();

        hub.notify("cart");

        let change = rx.recv().await.expect("change delivered");
        assert_eq!(change.key, "cart");
    }

    #[tokio::test]
    async fn notify_without_subscribers_is_silent() {
        let hub = ChangeHub::new();
        hub.notify("wishlist");
        assert_eq!(hub.receiver_count(), 0);
    }

    #[tokio::test]
    async fn dropped_receiver_deregisters() {
        let hub = ChangeHub::new();
        let rx = hub.subscribe();
        assert_eq!(hub.receiver_count(), 1);
        drop(rx);
        assert_eq!(hub.receiver_count(), 0);
    }

    #[tokio::test]
    async fn clones_share_the_channel() {
        let hub = ChangeHub::new();
        let clone = hub.clone();
        let mut rx = hub.subscribe();

        clone.notify("cart");

        assert_eq!(rx.recv().await.expect("delivered").key, "cart");
    }
}
