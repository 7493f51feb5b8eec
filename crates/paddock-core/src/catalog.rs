//! # Catalog
//!
//! The loaded shop: frozen snapshots of eras, cars, collectors and the
//! order history, plus the memoizing [`SalesRanker`].
//!
//! Snapshots are never mutated in place. A checkout builds a new order
//! snapshot and swaps it in, then clears the ranker so stale top-seller
//! results cannot be served.

use crate::filters::{ItemFilter, total_sales};
use crate::formats::SeedData;
use crate::garage::Garage;
use crate::hierarchy::{HierarchyIndex, HierarchyIssue};
use crate::maybe::Maybe;
use crate::ranking::{CacheStats, SalesRanker};
use crate::validation::{ValidatedOrder, stock_levels, validate_order};
use crate::{
    CategoryId, CategoryNode, Discount, Frozen, Item, ItemId, OrderId, OrderRecord, Owner,
    ShopError, primitives,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// METRICS
// =============================================================================

/// Overview numbers shown on the shop's landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogMetrics {
    pub owner_count: usize,
    pub item_count: usize,
    pub order_count: usize,
    /// Sum of all frozen order totals.
    pub market_volume: i64,
    pub era_count: usize,
    pub root_era_count: usize,
}

// =============================================================================
// CATALOG
// =============================================================================

/// An in-memory shop.
#[derive(Debug)]
pub struct Catalog {
    eras: Frozen<CategoryNode>,
    items: Frozen<Item>,
    owners: Frozen<Owner>,
    orders: Frozen<OrderRecord>,
    discounts: Frozen<Discount>,
    ranker: SalesRanker,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_seed(SeedData::default())
    }
}

impl Catalog {
    /// Load a seed leniently: dangling references and cycles are tolerated.
    #[must_use]
    pub fn from_seed(seed: SeedData) -> Self {
        Self::with_cache_capacity(seed, primitives::DEFAULT_CACHE_CAPACITY)
    }

    /// Load a seed with a custom ranker cache capacity.
    #[must_use]
    pub fn with_cache_capacity(seed: SeedData, capacity: usize) -> Self {
        Self {
            eras: seed.eras.into(),
            items: seed.items.into(),
            owners: seed.owners.into(),
            orders: seed.orders.into(),
            discounts: seed.discounts.into(),
            ranker: SalesRanker::new(capacity),
        }
    }

    /// Load a seed, failing if [`validate`](Self::validate) reports anything.
    pub fn from_seed_strict(seed: SeedData, capacity: usize) -> Result<Self, ShopError> {
        let catalog = Self::with_cache_capacity(seed, capacity);
        let issues = catalog.validate();
        if issues.is_empty() {
            Ok(catalog)
        } else {
            Err(ShopError::ValidationFailed(
                issues.iter().map(ToString::to_string).collect(),
            ))
        }
    }

    /// Copy the current state back out as a seed.
    #[must_use]
    pub fn to_seed(&self) -> SeedData {
        SeedData {
            eras: self.eras.to_vec(),
            items: self.items.to_vec(),
            owners: self.owners.to_vec(),
            orders: self.orders.to_vec(),
            discounts: self.discounts.to_vec(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn eras(&self) -> &Frozen<CategoryNode> {
        &self.eras
    }

    #[must_use]
    pub fn items(&self) -> &Frozen<Item> {
        &self.items
    }

    #[must_use]
    pub fn owners(&self) -> &Frozen<Owner> {
        &self.owners
    }

    #[must_use]
    pub fn orders(&self) -> &Frozen<OrderRecord> {
        &self.orders
    }

    #[must_use]
    pub fn discounts(&self) -> &Frozen<Discount> {
        &self.discounts
    }

    #[must_use]
    pub fn find_item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    // -------------------------------------------------------------------------
    // Hierarchy
    // -------------------------------------------------------------------------

    /// Eras under `root` in pre-order, root first. `None` walks every root.
    #[must_use]
    pub fn flatten(&self, root: Option<&CategoryId>) -> Vec<&CategoryNode> {
        HierarchyIndex::new(&self.eras).flatten(root)
    }

    /// Top-level eras, in seed order.
    #[must_use]
    pub fn root_eras(&self) -> Vec<&CategoryNode> {
        HierarchyIndex::new(&self.eras).roots()
    }

    /// Cars filed anywhere under `root`.
    #[must_use]
    pub fn collect_items(&self, root: &CategoryId) -> Vec<&Item> {
        HierarchyIndex::new(&self.eras).collect_items(&self.items, root)
    }

    /// The catalog page filter.
    #[must_use]
    pub fn browse(&self, filter: &ItemFilter) -> Vec<&Item> {
        filter.apply(&self.eras, &self.items)
    }

    /// Structural problems in the loaded data.
    #[must_use]
    pub fn validate(&self) -> Vec<HierarchyIssue> {
        HierarchyIndex::new(&self.eras).validate(&self.items)
    }

    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    /// The `k` best-selling cars, served from the ranker cache when possible.
    pub fn top_sellers(&self, k: usize) -> Result<Arc<[Item]>, ShopError> {
        if k > primitives::MAX_TOP_K {
            return Err(ShopError::InvalidQuery(format!(
                "k must be at most {}, got {}",
                primitives::MAX_TOP_K,
                k
            )));
        }
        Ok(self.ranker.top_k(&self.orders, &self.items, k))
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.ranker.stats()
    }

    /// Drop every cached top-seller result, returning how many were dropped.
    pub fn clear_cache(&self) -> usize {
        self.ranker.clear()
    }

    #[must_use]
    pub fn metrics(&self) -> CatalogMetrics {
        CatalogMetrics {
            owner_count: self.owners.len(),
            item_count: self.items.len(),
            order_count: self.orders.len(),
            market_volume: total_sales(&self.orders),
            era_count: self.eras.len(),
            root_era_count: self.eras.iter().filter(|e| e.is_root()).count(),
        }
    }

    // -------------------------------------------------------------------------
    // Garage & Orders
    // -------------------------------------------------------------------------

    /// Live price of a garage at current catalog prices.
    pub fn garage_total(&self, garage: &Garage) -> Result<i64, ShopError> {
        garage.total(&self.items)
    }

    /// Check an order against current stock and attach discounts.
    #[must_use]
    pub fn check_order(&self, order: &OrderRecord) -> Maybe<ValidatedOrder> {
        validate_order(order, &stock_levels(&self.items), &self.discounts)
    }

    /// The id the next checkout will receive: `order_<n>`, skipping taken ids.
    #[must_use]
    pub fn next_order_id(&self) -> OrderId {
        let mut n = self.orders.len() + 1;
        loop {
            let candidate = OrderId::new(format!("order_{}", n));
            if !self.orders.iter().any(|o| o.id == candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Finalize a garage into the order history.
    ///
    /// The collector must be registered. On success the order snapshot is
    /// replaced and the ranker cache cleared.
    pub fn checkout(
        &mut self,
        garage: &Garage,
        timestamp: impl Into<String>,
    ) -> Result<OrderRecord, ShopError> {
        if !self.owners.iter().any(|o| &o.id == garage.owner_id()) {
            return Err(ShopError::OwnerNotFound(garage.owner_id().clone()));
        }
        if garage.lines().len() > primitives::MAX_CHECKOUT_LINES {
            return Err(ShopError::InvalidQuery(format!(
                "at most {} lines per checkout",
                primitives::MAX_CHECKOUT_LINES
            )));
        }

        let order = garage.finalize(&self.items, self.next_order_id(), timestamp)?;
        self.orders = self.orders.with_appended(order.clone());
        self.ranker.clear();
        Ok(order)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineItem;

    fn seed() -> SeedData {
        SeedData {
            eras: vec![
                CategoryNode::new("era_v10", "V10", None),
                CategoryNode::new("era_v10_late", "Late V10", Some("era_v10")),
                CategoryNode::new("era_v8", "V8", None),
            ],
            items: vec![
                Item::new("bolid_1", "F2004", "Ferrari", 4_700_000, "era_v10_late").with_stock(2),
                Item::new("bolid_2", "F2007", "Ferrari", 3_600_000, "era_v8").with_stock(1),
                Item::new("bolid_3", "MP4/13", "McLaren", 2_500_000, "era_v10").with_stock(3),
            ],
            owners: vec![
                Owner::new("coll_1", "Anna", "Paddock Club"),
                Owner::new("coll_2", "Boris", "Grandstand"),
            ],
            orders: vec![OrderRecord::new(
                "order_1",
                "coll_2",
                vec![LineItem::new("bolid_3", 2)],
                5_000_000,
                "2024-01-01T00:00:00",
            )],
            discounts: vec![Discount::new("bolid_1", 10)],
        }
    }

    #[test]
    fn metrics_match_seed() {
        let catalog = Catalog::from_seed(seed());
        let m = catalog.metrics();
        assert_eq!(m.owner_count, 2);
        assert_eq!(m.item_count, 3);
        assert_eq!(m.order_count, 1);
        assert_eq!(m.market_volume, 5_000_000);
        assert_eq!(m.era_count, 3);
        assert_eq!(m.root_era_count, 2);
    }

    #[test]
    fn collect_under_root_era() {
        let catalog = Catalog::from_seed(seed());
        let ids: Vec<_> = catalog
            .collect_items(&"era_v10".into())
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["bolid_1", "bolid_3"]);
    }

    #[test]
    fn checkout_appends_and_clears_cache() {
        let mut catalog = Catalog::from_seed(seed());
        let before = catalog.top_sellers(5).expect("top");
        assert_eq!(before[0].id.as_str(), "bolid_3");
        let old_orders = catalog.orders().clone();

        let garage = Garage::new("coll_1").with_added("bolid_1", 3).expect("add");
        let order = catalog
            .checkout(&garage, "2024-06-01T12:00:00")
            .expect("checkout");

        assert_eq!(order.id.as_str(), "order_2");
        assert_eq!(order.total_price, 14_100_000);
        assert_eq!(old_orders.len(), 1);
        assert_eq!(catalog.orders().len(), 2);
        assert_eq!(catalog.cache_stats().len, 0);

        let after = catalog.top_sellers(5).expect("top");
        assert_eq!(after[0].id.as_str(), "bolid_1");
    }

    #[test]
    fn checkout_requires_known_owner() {
        let mut catalog = Catalog::from_seed(seed());
        let garage = Garage::new("nobody").with_added("bolid_1", 1).expect("add");
        let err = catalog.checkout(&garage, "t");
        assert!(matches!(err, Err(ShopError::OwnerNotFound(_))));
        assert_eq!(catalog.orders().len(), 1);
    }

    #[test]
    fn next_order_id_skips_taken() {
        let mut data = seed();
        data.orders.push(OrderRecord::new("order_2", "coll_1", vec![], 0, "t"));
        data.orders.push(OrderRecord::new("order_3", "coll_1", vec![], 0, "t"));
        data.orders.remove(0);
        let catalog = Catalog::from_seed(data);
        assert_eq!(catalog.next_order_id().as_str(), "order_4");
    }

    #[test]
    fn top_sellers_rejects_huge_k() {
        let catalog = Catalog::from_seed(seed());
        assert!(matches!(
            catalog.top_sellers(primitives::MAX_TOP_K + 1),
            Err(ShopError::InvalidQuery(_))
        ));
    }

    #[test]
    fn check_order_uses_stock_and_discounts() {
        let catalog = Catalog::from_seed(seed());
        let ok = OrderRecord::new("o", "coll_1", vec![LineItem::new("bolid_1", 2)], 0, "t");
        let validated = catalog.check_order(&ok).into_option().expect("in stock");
        assert_eq!(validated.lines[0].discount_percent, 10);

        let short = OrderRecord::new("o", "coll_1", vec![LineItem::new("bolid_2", 2)], 0, "t");
        assert!(catalog.check_order(&short).is_nothing());
    }

    #[test]
    fn strict_load_reports_dangling_era() {
        let mut data = seed();
        data.items.push(Item::new("bolid_9", "Ghost", "X", 1, "era_missing"));
        assert!(Catalog::from_seed_strict(seed(), 8).is_ok());
        let err = Catalog::from_seed_strict(data, 8).expect_err("strict");
        assert!(err.to_string().contains("era_missing"));
    }

    #[test]
    fn seed_round_trip_through_catalog() {
        let catalog = Catalog::from_seed(seed());
        assert_eq!(catalog.to_seed(), seed());
    }
}
