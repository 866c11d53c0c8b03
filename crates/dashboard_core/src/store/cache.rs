//! Short-lived memoization of lookups.
//!
//! # Invariants
//! - An entry older than the TTL is evicted on read and reported as a miss;
//!   expired and absent keys are indistinguishable to callers.
//! - Time is always passed in; the cache never reads a clock.

use std::collections::HashMap;

/// Default entry lifetime.
pub const DEFAULT_CACHE_TTL_MS: i64 = 5_000;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    written_at: i64,
    value: V,
}

/// Key/value cache with a fixed time-to-live.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    ttl_ms: i64,
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms: ttl_ms.max(0),
            entries: HashMap::new(),
        }
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    /// Returns a fresh value for `key`, evicting it when expired.
    pub fn get(&mut self, key: &str, now_ms: i64) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => now_ms - entry.written_at > self.ttl_ms,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V, now_ms: i64) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                written_at: now_ms,
                value,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL_MS)
    }
}
