//! In-memory mapping from virtual identifiers to cache entries.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// A process-lifetime map from virtual identifier to entry.
///
/// Entries are shared as `Arc`s so a caller can keep using an entry while a
/// concurrent request supersedes it. There is no eviction: a fresh compile of
/// the same identifier overwrites the previous entry. The lock is never held
/// across an `.await`, so a lookup and the matching `put` of one request may
/// interleave with other requests; two concurrent misses on the same
/// identifier both compile and the last write wins.
#[derive(Debug)]
pub struct EntryCache<E> {
    entries: Mutex<HashMap<String, Arc<E>>>,
}

impl<E> EntryCache<E> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<Arc<E>> {
        self.entries.lock().get(key).cloned()
    }

    /// Stores `entry` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, entry: Arc<E>) {
        self.entries.lock().insert(key.into(), entry);
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<E> Default for EntryCache<E> {
    fn default() -> Self {
        Self::new()
    }
}
