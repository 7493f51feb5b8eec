//! # Catalog Filters
//!
//! Item predicates and simple aggregates over the order history.
//!
//! Predicates are boxed closures so they can be picked at runtime and
//! combined with [`all_of`].

use crate::hierarchy::HierarchyIndex;
use crate::{CategoryId, CategoryNode, Item, OrderRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A runtime-selected item predicate.
pub type ItemPredicate = Box<dyn Fn(&Item) -> bool + Send + Sync>;

/// Items filed directly under `category_id` (no descendants).
#[must_use]
pub fn by_category(category_id: impl Into<String>) -> ItemPredicate {
    let category_id = CategoryId::new(category_id);
    Box::new(move |item: &Item| item.category_id == category_id)
}

/// Items priced within `min..=max`.
#[must_use]
pub fn by_price_range(min: i64, max: i64) -> ItemPredicate {
    Box::new(move |item: &Item| (min..=max).contains(&item.price))
}

/// Items carrying `tag`.
#[must_use]
pub fn by_tag(tag: impl Into<String>) -> ItemPredicate {
    let tag = tag.into();
    Box::new(move |item: &Item| item.has_tag(&tag))
}

/// Items built by `team`.
#[must_use]
pub fn by_team(team: impl Into<String>) -> ItemPredicate {
    let team = team.into();
    Box::new(move |item: &Item| item.team == team)
}

/// Conjunction of predicates. An empty list matches everything.
#[must_use]
pub fn all_of(predicates: Vec<ItemPredicate>) -> ItemPredicate {
    Box::new(move |item: &Item| predicates.iter().all(|p| p(item)))
}

/// Sum of the frozen order totals. Zero for no orders.
#[must_use]
pub fn total_sales(orders: &[OrderRecord]) -> i64 {
    orders
        .iter()
        .fold(0i64, |acc, order| acc.saturating_add(order.total_price))
}

/// Distinct team names, sorted.
#[must_use]
pub fn teams(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.team.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// BROWSE FILTER
// =============================================================================

/// The catalog page's combined filter.
///
/// Every field is optional; unset fields do not restrict the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Keep items anywhere under this era.
    #[serde(default)]
    pub era: Option<CategoryId>,
    #[serde(default)]
    pub min_price: Option<i64>,
    #[serde(default)]
    pub max_price: Option<i64>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl ItemFilter {
    /// Apply the filter, keeping catalog order.
    #[must_use]
    pub fn apply<'i>(&self, nodes: &[CategoryNode], items: &'i [Item]) -> Vec<&'i Item> {
        let in_era: Option<BTreeSet<CategoryId>> = self.era.as_ref().map(|root| {
            HierarchyIndex::new(nodes)
                .closure_ids(Some(root))
                .into_iter()
                .cloned()
                .collect()
        });

        let mut predicates = Vec::new();
        if self.min_price.is_some() || self.max_price.is_some() {
            predicates.push(by_price_range(
                self.min_price.unwrap_or(i64::MIN),
                self.max_price.unwrap_or(i64::MAX),
            ));
        }
        if let Some(team) = &self.team {
            predicates.push(by_team(team.as_str()));
        }
        if let Some(tag) = &self.tag {
            predicates.push(by_tag(tag.as_str()));
        }
        let matches = all_of(predicates);

        items
            .iter()
            .filter(|item| {
                in_era
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&item.category_id))
            })
            .filter(|item| matches(*item))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
