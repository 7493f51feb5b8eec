//! # Order Validation
//!
//! Stock and discount checks expressed with [`Maybe`].
//!
//! Validation never errors: an order that cannot be fulfilled simply
//! yields `Maybe::Nothing`. Prices are not recomputed here; the frozen
//! order total stays authoritative.

use crate::maybe::Maybe;
use crate::{Discount, Item, ItemId, OrderId, OrderRecord, OwnerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Look an item up by id.
#[must_use]
pub fn safe_item_find<'a>(items: &'a [Item], id: &ItemId) -> Maybe<&'a Item> {
    items.iter().find(|item| &item.id == id).into()
}

/// Current stock per item.
#[must_use]
pub fn stock_levels(items: &[Item]) -> BTreeMap<ItemId, u32> {
    items
        .iter()
        .map(|item| (item.id.clone(), item.quantity_available))
        .collect()
}

/// One checked order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedLine {
    pub item_id: ItemId,
    pub quantity: u32,
    /// Applicable discount in whole percent, 0 if none.
    pub discount_percent: u8,
}

/// An order that passed the stock check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedOrder {
    pub order_id: OrderId,
    pub owner_id: OwnerId,
    pub lines: Vec<ValidatedLine>,
}

/// Check every line against stock and attach discounts.
///
/// Returns `Nothing` as soon as one line asks for more units than are in
/// stock. Items missing from `stock` count as zero stock.
#[must_use]
pub fn validate_order(
    order: &OrderRecord,
    stock: &BTreeMap<ItemId, u32>,
    discounts: &[Discount],
) -> Maybe<ValidatedOrder> {
    let discount_of: BTreeMap<&ItemId, u8> =
        discounts.iter().map(|d| (&d.item_id, d.percent)).collect();

    let mut lines = Vec::with_capacity(order.line_items.len());
    for line in &order.line_items {
        let available = stock.get(&line.item_id).copied().unwrap_or(0);
        if available < line.quantity {
            return Maybe::Nothing;
        }
        lines.push(ValidatedLine {
            item_id: line.item_id.clone(),
            quantity: line.quantity,
            discount_percent: discount_of.get(&line.item_id).copied().unwrap_or(0),
        });
    }

    Maybe::Some(ValidatedOrder {
        order_id: order.id.clone(),
        owner_id: order.owner_id.clone(),
        lines,
    })
}

/// Price after applying a whole-percent discount, rounded down.
#[must_use]
pub fn discounted_price(price: i64, percent: u8) -> i64 {
    let keep = 100 - i64::from(percent.min(100));
    price.saturating_mul(keep) / 100
}
