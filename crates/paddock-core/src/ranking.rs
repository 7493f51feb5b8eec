//! # Sales Ranker
//!
//! Top-seller aggregation over the order history, memoized per input.
//!
//! ## Ranking Rules
//!
//! 1. A tally is seeded from the catalog in catalog order, every item at 0.
//! 2. Every order line adds its quantity. Lines for items outside the
//!    catalog are dropped.
//! 3. Items are stable-sorted by descending quantity, so ties keep catalog
//!    order. Items that never sold are not ranked.
//! 4. The first `k` survive.
//!
//! ## Memoization
//!
//! Results are cached by the value of `(orders, items, k)` in a bounded LRU
//! cache owned by the ranker. Nothing invalidates the cache automatically;
//! whoever changes the underlying data calls [`SalesRanker::clear`].
//!
//! The cache key only accepts [`Frozen`] snapshots, so a growable
//! collection cannot be used as a key:
//!
//! ```compile_fail
//! use paddock_core::{Frozen, Item, OrderRecord, SalesRanker};
//!
//! let ranker = SalesRanker::default();
//! let orders: Vec<OrderRecord> = Vec::new();
//! let items: Frozen<Item> = Frozen::empty();
//! let _ = ranker.top_k(&orders, &items, 3);
//! ```
//!
//! ## Concurrency
//!
//! The cache sits behind a mutex held only for check-then-insert. Each key
//! owns a `OnceLock` slot, so concurrent callers with the same key wait for
//! a single computation instead of racing.

use crate::cache::LruCache;
use crate::primitives::DEFAULT_CACHE_CAPACITY;
use crate::{Frozen, Item, ItemId, OrderRecord};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

// =============================================================================
// PURE AGGREGATION
// =============================================================================

/// Per-item sold quantities, in catalog order.
///
/// Every catalog item appears, including those that never sold.
#[must_use]
pub fn sales_tally<'a>(orders: &[OrderRecord], items: &'a [Item]) -> Vec<(&'a Item, u64)> {
    let mut position: BTreeMap<&ItemId, usize> = BTreeMap::new();
    for (pos, item) in items.iter().enumerate() {
        position.entry(&item.id).or_insert(pos);
    }

    let mut counts = vec![0u64; items.len()];
    for line in orders.iter().flat_map(|o| &o.line_items) {
        if let Some(&pos) = position.get(&line.item_id) {
            counts[pos] = counts[pos].saturating_add(line.quantity as u64);
        }
    }

    items.iter().zip(counts).collect()
}

/// Rank the best sellers without touching any cache.
#[must_use]
pub fn rank_top_k(orders: &[OrderRecord], items: &[Item], k: usize) -> Vec<Item> {
    let mut tally: Vec<_> = sales_tally(orders, items)
        .into_iter()
        .filter(|(_, sold)| *sold > 0)
        .collect();

    // sort_by is stable: equal quantities keep catalog order.
    tally.sort_by(|a, b| b.1.cmp(&a.1));

    tally
        .into_iter()
        .take(k)
        .map(|(item, _)| item.clone())
        .collect()
}

// =============================================================================
// CACHE KEY & STATS
// =============================================================================

/// Value-compared cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SalesKey {
    orders: Frozen<OrderRecord>,
    items: Frozen<Item>,
    k: usize,
}

type Slot = Arc<OnceLock<Arc<[Item]>>>;

/// Observable cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Calls answered from an existing slot.
    pub hits: u64,
    /// Calls that had to create a slot.
    pub misses: u64,
    /// Number of times the ranking was actually computed.
    pub computations: u64,
    /// Entries currently cached.
    pub len: usize,
    /// Maximum number of entries.
    pub capacity: usize,
}

// =============================================================================
// SALES RANKER
// =============================================================================

/// Memoizing top-K ranker.
#[derive(Debug)]
pub struct SalesRanker {
    cache: Mutex<LruCache<SalesKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
}

impl Default for SalesRanker {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SalesRanker {
    /// Create a ranker remembering up to `capacity` distinct inputs.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            computations: AtomicU64::new(0),
        }
    }

    /// The `k` best-selling items, most sold first.
    ///
    /// Equal inputs return the cached sequence without recomputation until
    /// the entry is evicted or [`clear`](Self::clear) is called.
    pub fn top_k(
        &self,
        orders: &Frozen<OrderRecord>,
        items: &Frozen<Item>,
        k: usize,
    ) -> Arc<[Item]> {
        if k == 0 {
            return Arc::from(Vec::new());
        }

        let key = SalesKey {
            orders: orders.clone(),
            items: items.clone(),
            k,
        };

        let slot = {
            let mut cache = self.lock();
            if let Some(slot) = cache.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Arc::clone(slot)
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let slot: Slot = Arc::new(OnceLock::new());
                cache.insert(key, Arc::clone(&slot));
                slot
            }
        };

        let ranked = slot.get_or_init(|| {
            self.computations.fetch_add(1, Ordering::Relaxed);
            rank_top_k(orders, items, k).into()
        });
        Arc::clone(ranked)
    }

    /// Forget every cached result, returning how many were dropped.
    ///
    /// Count and removal happen under one lock.
    pub fn clear(&self) -> usize {
        let mut cache = self.lock();
        let dropped = cache.len();
        cache.clear();
        dropped
    }

    /// Snapshot of the cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let cache = self.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            len: cache.len(),
            capacity: cache.capacity(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<SalesKey, Slot>> {
        // The guarded map is never left half-updated, so a poisoned lock
        // is still usable.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// TESTS
// =============================================================================
