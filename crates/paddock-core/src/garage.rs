//! # Garage
//!
//! A collector's staging area for cars they intend to buy.
//!
//! The garage only grows: adding an item that is already present sums
//! the quantities. Finalizing prices every line against the catalog and
//! freezes the total into an [`OrderRecord`]. Emptying the garage after a
//! purchase is up to the caller.

use crate::primitives::MAX_LINE_QUANTITY;
use crate::{Item, ItemId, LineItem, OrderId, OrderRecord, OwnerId, ShopError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A per-collector cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Garage {
    owner_id: OwnerId,
    /// Lines in the order they were first added.
    lines: Vec<LineItem>,
}

impl Garage {
    /// Create an empty garage for a collector.
    #[must_use]
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: OwnerId::new(owner_id),
            lines: Vec::new(),
        }
    }

    /// The collector this garage belongs to.
    #[must_use]
    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Current lines, in first-added order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of `item_id` currently staged (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, item_id: &ItemId) -> u32 {
        self.lines
            .iter()
            .find(|l| &l.item_id == item_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Add `quantity` units of an item, merging with an existing line.
    pub fn add(&mut self, item_id: impl Into<String>, quantity: u32) -> Result<(), ShopError> {
        let item_id = ItemId::new(item_id);
        if quantity == 0 || quantity > MAX_LINE_QUANTITY {
            return Err(ShopError::InvalidQuantity {
                item: item_id,
                quantity,
            });
        }

        match self.lines.iter_mut().find(|l| l.item_id == item_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(LineItem { item_id, quantity }),
        }
        Ok(())
    }

    /// Builder-style [`add`](Self::add) that leaves `self` untouched.
    pub fn with_added(&self, item_id: impl Into<String>, quantity: u32) -> Result<Self, ShopError> {
        let mut next = self.clone();
        next.add(item_id, quantity)?;
        Ok(next)
    }

    /// Price the garage at current catalog prices.
    pub fn total(&self, items: &[Item]) -> Result<i64, ShopError> {
        let prices: BTreeMap<&ItemId, i64> = items.iter().map(|i| (&i.id, i.price)).collect();

        self.lines.iter().try_fold(0i64, |acc, line| {
            let price = prices
                .get(&line.item_id)
                .ok_or_else(|| ShopError::ItemNotFound(line.item_id.clone()))?;
            Ok(acc.saturating_add(price.saturating_mul(line.quantity as i64)))
        })
    }

    /// Turn the garage into an order with a frozen total.
    pub fn finalize(
        &self,
        items: &[Item],
        order_id: OrderId,
        timestamp: impl Into<String>,
    ) -> Result<OrderRecord, ShopError> {
        if self.lines.is_empty() {
            return Err(ShopError::EmptyGarage);
        }
        let total_price = self.total(items)?;

        Ok(OrderRecord {
            id: order_id,
            owner_id: self.owner_id.clone(),
            line_items: self.lines.clone(),
            total_price,
            timestamp: timestamp.into(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
