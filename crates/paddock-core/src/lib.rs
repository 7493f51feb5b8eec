//! # paddock-core
//!
//! The deterministic catalog engine for Paddock, an F1 collectible car shop.
//!
//! This crate holds all domain logic:
//! - The era hierarchy (`hierarchy`): flattening and item collection
//! - The memoized top-seller ranking (`ranking`, backed by `cache`)
//! - The garage, filters and order validation
//! - Seed and snapshot encodings (`formats`)
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: NO async, NO network, NO file I/O
//! - No floating point: prices are whole dollars, discounts whole percents
//! - Records are immutable once loaded; changes produce new snapshots

// =============================================================================
// MODULES
// =============================================================================

pub mod cache;
pub mod catalog;
pub mod filters;
pub mod formats;
pub mod garage;
pub mod hierarchy;
pub mod maybe;
pub mod pipe;
pub mod primitives;
pub mod ranking;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CategoryId, CategoryNode, Discount, Frozen, Item, ItemId, LineItem, OrderId, OrderRecord,
    Owner, OwnerId, ShopError,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use cache::LruCache;
pub use catalog::{Catalog, CatalogMetrics};
pub use filters::{
    ItemFilter, ItemPredicate, all_of, by_category, by_price_range, by_tag, by_team, teams,
    total_sales,
};
pub use garage::Garage;
pub use hierarchy::{HierarchyIndex, HierarchyIssue, collect_items, flatten};
pub use maybe::Maybe;
pub use pipe::{Pipeline, Step, pipe};
pub use ranking::{CacheStats, SalesRanker, rank_top_k, sales_tally};
pub use validation::{
    ValidatedLine, ValidatedOrder, discounted_price, safe_item_find, stock_levels, validate_order,
};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

#[cfg(feature = "crypto-hash")]
pub use formats::snapshot_checksum;
pub use formats::{
    SeedData, SnapshotHeader, base_seed, seed_from_json, seed_to_json, snapshot_from_bytes,
    snapshot_to_bytes,
};
