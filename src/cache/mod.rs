//! Kernel value cache
//!
//! LRU cache for kernel matrix entries so the solver avoids recomputing
//! K(i, j) across iterations. The kernel matrix is symmetric, so entries
//! are stored under normalized (i, j) keys with i <= j. Capacity is
//! derived from the configured cache budget in megabytes.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache key normalized so that i <= j
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey(usize, usize);

impl PairKey {
    fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self(i, j)
        } else {
            Self(j, i)
        }
    }
}

/// LRU cache of kernel values keyed by sample index pairs
pub struct KernelCache {
    entries: LruCache<PairKey, f64>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Rough bytes per cache entry: key, value, and map overhead
    const ENTRY_BYTES: usize = 48;

    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a cache sized to a memory budget in megabytes
    pub fn with_budget_mb(megabytes: usize) -> Self {
        Self::new((megabytes * 1024 * 1024) / Self::ENTRY_BYTES)
    }

    /// Look up K(i, j), computing and storing it on a miss
    pub fn get_or_compute<F: FnOnce() -> f64>(&mut self, i: usize, j: usize, compute: F) -> f64 {
        let key = PairKey::new(i, j);
        if let Some(&value) = self.entries.get(&key) {
            self.hits += 1;
            return value;
        }
        self.misses += 1;
        let value = compute();
        self.entries.put(key, value);
        value
    }

    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
