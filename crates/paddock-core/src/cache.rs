//! # Bounded LRU Cache
//!
//! A small least-recently-used map used to memoize ranking results.
//!
//! Recency is tracked with a monotonically increasing tick. The entry with
//! the smallest tick is evicted once the cache grows past its capacity.
//! Both `get` and `insert` count as a use.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// A capacity-bounded map with least-recently-used eviction.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    capacity: usize,
    entries: HashMap<K, (V, u64)>,
    /// tick -> key, oldest first
    recency: BTreeMap<u64, K>,
    tick: u64,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Create a cache that holds at most `capacity` entries.
    ///
    /// A capacity of zero disables caching: inserts are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is cached. Does not touch recency.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let next = self.next_tick();
        let (_, tick) = self.entries.get_mut(key)?;
        let old = std::mem::replace(tick, next);
        if let Some(k) = self.recency.remove(&old) {
            self.recency.insert(next, k);
        }
        self.entries.get(key).map(|(value, _)| value)
    }

    /// Insert or replace `key`, evicting the oldest entries beyond capacity.
    ///
    /// Returns the evicted keys, oldest first.
    pub fn insert(&mut self, key: K, value: V) -> Vec<K> {
        if self.capacity == 0 {
            return Vec::new();
        }

        let next = self.next_tick();
        if let Some((_, old)) = self.entries.insert(key.clone(), (value, next)) {
            self.recency.remove(&old);
        }
        self.recency.insert(next, key);

        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity {
            let Some((_, oldest)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
            evicted.push(oldest);
        }
        evicted
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn next_tick(&mut self) -> u64 {
        self.tick = self.tick.saturating_add(1);
        self.tick
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);

        // Touch "a" so "b" becomes the oldest.
        assert_eq!(cache.get(&"a"), Some(&1));

        let evicted = cache.insert("c", 3);
        assert_eq!(evicted, vec!["b"]);
        assert!(cache.contains(&"a"));
        assert!(cache.contains(&"c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn replace_does_not_grow() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("a", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), Some(&2));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut cache = LruCache::new(0);
        assert!(cache.insert("a", 1).is_empty());
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn clear_empties_everything() {
        let mut cache = LruCache::new(4);
        cache.insert(1u32, "x");
        cache.insert(2u32, "y");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn miss_does_not_change_contents() {
        let mut cache = LruCache::new(1);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"zzz"), None);
        assert_eq!(cache.capacity(), 1);
        assert!(cache.contains(&"a"));
    }
}
