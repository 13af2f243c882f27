//! Reference resolution cache for catsync.
//!
//! Maps opaque platform ids to stable, human-assigned keys so that diffs can
//! compare references by key instead of by id.
//!
//! The cache is bounded and evicts the least recently used entry once full.
//! Eviction is silent: a miss means "not known yet", and callers re-fetch from
//! the platform when they need the mapping again.
//!
//! One cache instance is constructed per sync session and shared by reference
//! (`Arc<ReferenceCache>`) between the concurrent fetch and diff tasks of that
//! session. All operations take `&self`; locking is internal.
//!
//! # Example
//!
//! ```
//! use catsync_cache::ReferenceCache;
//!
//! let cache = ReferenceCache::new(100);
//! cache.add("id1", "key1");
//! assert_eq!(cache.get("id1").as_deref(), Some("key1"));
//!
//! cache.remove("id1");
//! assert!(!cache.contains_key("id1"));
//! ```

use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use tracing::debug;

/// Default number of entries kept by [`ReferenceCache::default`].
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded, thread-safe id → key map with LRU eviction.
pub struct ReferenceCache {
    entries: Mutex<Entries>,
}

struct Entries {
    by_id: LruCache<String, String>,
    /// key → id, kept in step with `by_id`.
    by_key: HashMap<String, String>,
}

impl Entries {
    /// Drops the reverse entry of `key` if it still points at `id`.
    fn unlink(&mut self, id: &str, key: &str) {
        if self.by_key.get(key).is_some_and(|cached| cached == id) {
            self.by_key.remove(key);
        }
    }
}

impl ReferenceCache {
    /// Creates a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(Entries {
                by_id: LruCache::new(capacity),
                by_key: HashMap::new(),
            }),
        }
    }

    /// Records the key of a resource id. A racing `add` for the same id wins
    /// if it runs last.
    pub fn add(&self, id: impl Into<String>, key: impl Into<String>) {
        let (id, key) = (id.into(), key.into());
        let mut entries = self.entries.lock();
        if let Some(previous) = entries.by_id.peek(&id).cloned() {
            entries.unlink(&id, &previous);
        }
        entries.by_key.insert(key.clone(), id.clone());
        if let Some((evicted_id, evicted_key)) = entries.by_id.push(id.clone(), key) {
            if evicted_id != id {
                entries.unlink(&evicted_id, &evicted_key);
                debug!(id = %evicted_id, "evicted reference from cache");
            }
        }
    }

    /// Records many id → key pairs.
    pub fn add_all<I, S, T>(&self, pairs: I)
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        for (id, key) in pairs {
            self.add(id, key);
        }
    }

    /// Returns the key for an id, marking the entry as recently used.
    pub fn get(&self, id: &str) -> Option<String> {
        self.entries.lock().by_id.get(id).cloned()
    }

    /// Returns true if the id is cached. Does not affect recency.
    pub fn contains_key(&self, id: &str) -> bool {
        self.entries.lock().by_id.contains(id)
    }

    /// Removes an id, returning its key if it was cached.
    pub fn remove(&self, id: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        let key = entries.by_id.pop(id)?;
        entries.unlink(id, &key);
        Some(key)
    }

    /// Reverse lookup: returns the id cached for a key, if any, marking the
    /// entry as recently used.
    pub fn id_for_key(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        let id = entries.by_key.get(key).cloned()?;
        entries.by_id.promote(&id);
        Some(id)
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.by_id.clear();
        entries.by_key.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().by_id.cap().get()
    }
}

impl Default for ReferenceCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for ReferenceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("ReferenceCache")
            .field("len", &entries.by_id.len())
            .field("capacity", &entries.by_id.cap())
            .finish()
    }
}
