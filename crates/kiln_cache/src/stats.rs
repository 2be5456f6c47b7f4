//! Hit/miss counters for a build session.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counts cache hits and misses across all entry caches of a session.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// A point-in-time copy of [`CacheStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Requests answered from a valid entry.
    pub hits: u64,
    /// Requests that had to compile.
    pub misses: u64,
}

impl CacheStats {
    /// Records a reused entry.
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a compile.
    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current counts.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Counts accumulated since `earlier`.
    pub fn since(self, earlier: StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits - earlier.hits,
            misses: self.misses - earlier.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_deltas() {
        let stats = CacheStats::default();
        stats.miss();
        let first = stats.snapshot();
        stats.hit();
        stats.hit();
        let delta = stats.snapshot().since(first);
        assert_eq!(delta, StatsSnapshot { hits: 2, misses: 0 });
        assert_eq!(stats.snapshot().misses, 1);
    }
}
