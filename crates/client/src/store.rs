//! Persistent key→JSON store with change notification.
//!
//! One file per key under a data directory, plus an in-memory copy that is
//! always authoritative for the current process. Persistence failures (no
//! directory, full disk, unreadable file) degrade to in-memory-only behavior
//! for that key: logged, never surfaced to the caller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use crate::notify::{ChangeHub, StoreChange};

/// Durable key→JSON value store.
///
/// Cheaply cloneable; clones share state and converge after any write from
/// any of them. Writes broadcast a [`StoreChange`] through the attached hub.
#[derive(Debug, Clone)]
pub struct LocalStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    /// Data directory, or `None` when running purely in memory.
    dir: Option<PathBuf>,
    values: Mutex<HashMap<String, serde_json::Value>>,
    hub: ChangeHub,
}

impl LocalStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// If the directory cannot be created the store still works, in memory
    /// only; the failure is logged once here.
    #[must_use]
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let dir = match std::fs::create_dir_all(&dir) {
            Ok(()) => Some(dir),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "store directory unavailable, running in memory");
                None
            }
        };

        Self {
            inner: Arc::new(StoreInner {
                dir,
                values: Mutex::new(HashMap::new()),
                hub: ChangeHub::new(),
            }),
        }
    }

    /// Create a store with no backing directory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                dir: None,
                values: Mutex::new(HashMap::new()),
                hub: ChangeHub::new(),
            }),
        }
    }

    /// Read the value under `key`, falling back to `default`.
    ///
    /// Missing keys, unreadable files, and parse failures all yield the
    /// default; failures are logged, never returned.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        if let Some(value) = self.cached(key) {
            match serde_json::from_value(value) {
                Ok(parsed) => return parsed,
                Err(e) => {
                    tracing::warn!(key, error = %e, "cached value does not match requested type");
                    return default;
                }
            }
        }

        let Some(path) = self.file_for(key) else {
            return default;
        };

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return default,
            Err(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "failed to read store file");
                return default;
            }
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => {
                let parsed = serde_json::from_value(value.clone());
                self.cache(key, value);
                match parsed {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        tracing::warn!(key, error = %e, "stored value does not match requested type");
                        default
                    }
                }
            }
            Err(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "corrupt store file");
                default
            }
        }
    }

    /// Write `value` under `key` and notify subscribers.
    ///
    /// The in-memory copy always updates; persistence is best-effort. The
    /// change signal fires even when only the in-memory copy changed, since
    /// same-process consumers read through that copy.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key, error = %e, "value not serializable, write dropped");
                return;
            }
        };

        self.cache(key, value.clone());

        if let Some(path) = self.file_for(key) {
            let payload = value.to_string();
            if let Err(e) = std::fs::write(&path, payload) {
                tracing::warn!(key, path = %path.display(), error = %e, "failed to persist store file");
            }
        }

        self.inner.hub.notify(key);
    }

    /// Remove `key` entirely and notify subscribers.
    pub fn remove(&self, key: &str) {
        if let Ok(mut values) = self.inner.values.lock() {
            values.remove(key);
        }

        if let Some(path) = self.file_for(key)
            && let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(key, path = %path.display(), error = %e, "failed to remove store file");
        }

        self.inner.hub.notify(key);
    }

    /// Subscribe to change notifications for this store.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.inner.hub.subscribe()
    }

    fn cached(&self, key: &str) -> Option<serde_json::Value> {
        self.inner
            .values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    fn cache(&self, key: &str, value: serde_json::Value) {
        if let Ok(mut values) = self.inner.values.lock() {
            values.insert(key.to_owned(), value);
        }
    }

    /// File path for `key`, or `None` when in memory-only mode or the key
    /// would escape the data directory.
    fn file_for(&self, key: &str) -> Option<PathBuf> {
        let dir = self.inner.dir.as_ref()?;
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            tracing::warn!(key, "key not representable as a file name, kept in memory");
            return None;
        }
        Some(dir.join(format!("{key}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_key_returns_default() {
        let store = LocalStore::in_memory();
        let value: Vec<String> = store.read("cart", Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path());

        store.write("cart", &vec!["a1".to_owned(), "b2".to_owned()]);

        let value: Vec<String> = store.read("cart", Vec::new());
        assert_eq!(value, vec!["a1".to_owned(), "b2".to_owned()]);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = LocalStore::open(dir.path());
            store.write("wishlist", &vec!["w3".to_owned()]);
        }

        let reopened = LocalStore::open(dir.path());
        let value: Vec<String> = reopened.read("wishlist", Vec::new());
        assert_eq!(value, vec!["w3".to_owned()]);
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("cart.json"), "{not json").expect("write");

        let store = LocalStore::open(dir.path());
        let value: Vec<String> = store.read("cart", Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn unwritable_directory_degrades_to_memory() {
        // A file used as the directory path makes create_dir_all fail.
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, "x").expect("write");

        let store = LocalStore::open(&blocker);
        store.write("cart", &vec!["a1".to_owned()]);

        let value: Vec<String> = store.read("cart", Vec::new());
        assert_eq!(value, vec!["a1".to_owned()]);
    }

    #[test]
    fn hostile_key_stays_in_memory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path());

        store.write("../escape", &42_u32);

        assert_eq!(store.read("../escape", 0_u32), 42);
        assert!(!dir.path().join("../escape.json").exists());
    }

    #[test]
    fn clones_share_state() {
        let store = LocalStore::in_memory();
        let clone = store.clone();

        store.write("cart", &vec!["a1".to_owned()]);

        let value: Vec<String> = clone.read("cart", Vec::new());
        assert_eq!(value, vec!["a1".to_owned()]);
    }

    #[tokio::test]
    async fn write_notifies_subscribers() {
        let store = LocalStore::in_memory();
        let mut rx = store.subscribe();

        store.write("cart", &vec!["a1".to_owned()]);

        let change = rx.recv().await.expect("change delivered");
        assert_eq!(change.key, "cart");
    }

    #[tokio::test]
    async fn remove_clears_and_notifies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path());
        store.write("cart", &vec!["a1".to_owned()]);

        let mut rx = store.subscribe();
        store.remove("cart");

        assert_eq!(rx.recv().await.expect("delivered").key, "cart");
        let value: Vec<String> = store.read("cart", Vec::new());
        assert!(value.is_empty());
        assert!(!dir.path().join("cart.json").exists());
    }
}
