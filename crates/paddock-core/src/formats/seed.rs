//! # Seed File
//!
//! JSON layout of `seed.json`:
//!
//! ```json
//! {
//!   "eras": [ { "id": "era_v10", "name": "...", "parent": null } ],
//!   "bolids": [ { "id": "bolid_1", "era_id": "era_v10_late", ... } ],
//!   "collectors": [ { "id": "coll_1", "name": "...", "tier": "Paddock Club" } ],
//!   "purchase_orders": [ { "id": "order_1", "collector_id": "coll_1", "items": [...] } ]
//! }
//! ```
//!
//! Every top-level key is optional and defaults to an empty list.

use crate::primitives::MAX_SEED_SIZE;
use crate::{CategoryNode, Discount, Item, OrderRecord, Owner, ShopError};
use serde::{Deserialize, Serialize};

/// Everything a catalog is loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub eras: Vec<CategoryNode>,
    #[serde(default, rename = "bolids")]
    pub items: Vec<Item>,
    #[serde(default, rename = "collectors")]
    pub owners: Vec<Owner>,
    #[serde(default, rename = "purchase_orders")]
    pub orders: Vec<OrderRecord>,
    #[serde(default)]
    pub discounts: Vec<Discount>,
}

/// Parse a seed file.
///
/// The size limit is checked before any parsing happens.
pub fn seed_from_json(bytes: &[u8]) -> Result<SeedData, ShopError> {
    if bytes.len() > MAX_SEED_SIZE {
        return Err(ShopError::DeserializationError(format!(
            "Seed size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SEED_SIZE
        )));
    }

    serde_json::from_slice(bytes)
        .map_err(|e| ShopError::DeserializationError(format!("Invalid seed JSON: {}", e)))
}

/// Render a seed file as pretty-printed UTF-8 JSON.
pub fn seed_to_json(seed: &SeedData) -> Result<String, ShopError> {
    serde_json::to_string_pretty(seed).map_err(|e| ShopError::SerializationError(e.to_string()))
}

/// The era tree a fresh shop starts with: three root eras and their
/// sub-eras, no cars, no collectors, no orders.
#[must_use]
pub fn base_seed() -> SeedData {
    let eras = vec![
        CategoryNode::new("era_v10", "Эра V10 (1995-2005)", None),
        CategoryNode::new("era_v8", "Эра V8 (2006-2013)", None),
        CategoryNode::new("era_hybrid", "Гибридная эра (2014-н.в.)", None),
        CategoryNode::new("era_v10_early", "Ранние V10 (1995-1999)", Some("era_v10")),
        CategoryNode::new("era_v10_late", "Поздние V10 (2000-2005)", Some("era_v10")),
        CategoryNode::new(
            "era_hybrid_early",
            "Ранние гибриды (2014-2016)",
            Some("era_hybrid"),
        ),
        CategoryNode::new(
            "era_hybrid_wide",
            "Широкие машины (2017-2021)",
            Some("era_hybrid"),
        ),
        CategoryNode::new(
            "era_ground_effect",
            "Граунд-эффект (2022-н.в.)",
            Some("era_hybrid"),
        ),
    ];

    SeedData {
        eras,
        ..SeedData::default()
    }
}
