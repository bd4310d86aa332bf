//! Shared keyed cache for transform plans and filterbanks.
//!
//! Entries are built lazily on the first request for a key and shared as
//! `Arc<V>` afterwards. Each key owns a [`OnceLock`] cell, so concurrent
//! misses on the same key run the builder exactly once while misses on other
//! keys proceed independently. The map lock is only held to look up or
//! insert the cell, never while building.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

type Cell<V> = Arc<OnceLock<Arc<V>>>;

/// Process-wide map from key to a lazily built, shared resource.
pub struct KeyedCache<K, V> {
    entries: RwLock<HashMap<K, Cell<V>>>,
    builds: AtomicUsize,
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        }
    }

    /// Return the entry for `key`, building it with `build` on first use.
    pub fn get_or_build(&self, key: &K, build: impl FnOnce() -> V) -> Arc<V> {
        let cell = self.cell(key);
        Arc::clone(cell.get_or_init(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            Arc::new(build())
        }))
    }

    /// Return the entry for `key` if it has already been built.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries
            .read()
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of builder invocations since creation.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry. Outstanding `Arc`s stay valid.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn cell(&self, key: &K) -> Cell<V> {
        if let Some(cell) = self.entries.read().get(key) {
            return Arc::clone(cell);
        }
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(key.clone()).or_default())
    }
}

impl<K, V> Default for KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for KeyedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedCache")
            .field("len", &self.entries.read().len())
            .field("builds", &self.builds.load(Ordering::Relaxed))
            .finish()
    }
}
