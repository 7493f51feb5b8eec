//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use paddock_core::{
    CategoryNode, Garage, HierarchyIndex, Item, OrderRecord, ShopError,
    primitives::MAX_CHECKOUT_LINES,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Shop overview plus ranker cache counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub owner_count: usize,
    pub item_count: usize,
    pub order_count: usize,
    pub market_volume: i64,
    pub era_count: usize,
    pub root_era_count: usize,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

// =============================================================================
// ERAS
// =============================================================================

/// Query string for `GET /eras`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErasQuery {
    /// Root era; all top-level eras when absent.
    #[serde(default)]
    pub root: Option<String>,
}

/// One era in a flattened listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraJson {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
    /// Distance from the first emitted ancestor, 0 for the listing's roots.
    pub depth: usize,
}

/// Flattened era listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErasResponse {
    pub eras: Vec<EraJson>,
}

impl ErasResponse {
    /// Attach depths to a pre-order listing.
    pub fn from_flattened(nodes: &[&CategoryNode]) -> Self {
        Self {
            eras: with_depths(nodes),
        }
    }
}

/// Pair each node of a pre-order listing with its depth.
///
/// A node whose parent was not emitted earlier starts a new level-0 branch.
pub fn with_depths(nodes: &[&CategoryNode]) -> Vec<EraJson> {
    let mut depth_of: BTreeMap<&str, usize> = BTreeMap::new();
    nodes
        .iter()
        .map(|node| {
            let depth = node
                .parent
                .as_ref()
                .and_then(|p| depth_of.get(p.as_str()))
                .map_or(0, |d| d + 1);
            depth_of.insert(node.id.as_str(), depth);
            EraJson {
                id: node.id.to_string(),
                name: node.name.clone(),
                parent: node.parent.as_ref().map(ToString::to_string),
                depth,
            }
        })
        .collect()
}

/// Depth-annotated listing of a whole hierarchy, used by the CLI too.
pub fn era_tree(nodes: &[CategoryNode], root: Option<&paddock_core::CategoryId>) -> Vec<EraJson> {
    with_depths(&HierarchyIndex::new(nodes).flatten(root))
}

// =============================================================================
// ITEMS
// =============================================================================

/// A list of catalog items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub count: usize,
    pub items: Vec<Item>,
}

impl ItemsResponse {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

/// Query string for `GET /top`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopQuery {
    #[serde(default)]
    pub k: Option<usize>,
}

/// Best sellers, most sold first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopResponse {
    pub success: bool,
    pub k: usize,
    pub items: Vec<Item>,
    pub error: Option<String>,
}

impl TopResponse {
    pub fn success(k: usize, items: Vec<Item>) -> Self {
        Self {
            success: true,
            k,
            items,
            error: None,
        }
    }

    pub fn error(k: usize, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            k,
            items: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// GARAGE
// =============================================================================

/// One garage line in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarageLine {
    pub bolid_id: String,
    pub quantity: u32,
}

/// Body of `POST /garage/checkout` and `POST /garage/quote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarageRequest {
    pub collector_id: String,
    pub items: Vec<GarageLine>,
}

impl GarageRequest {
    /// Build a garage, merging repeated lines.
    ///
    /// The line count is checked at the API boundary before any merging.
    pub fn to_garage(&self) -> Result<Garage, ShopError> {
        if self.items.len() > MAX_CHECKOUT_LINES {
            return Err(ShopError::InvalidQuery(format!(
                "at most {} lines per garage, got {}",
                MAX_CHECKOUT_LINES,
                self.items.len()
            )));
        }

        let mut garage = Garage::new(self.collector_id.as_str());
        for line in &self.items {
            garage.add(line.bolid_id.as_str(), line.quantity)?;
        }
        Ok(garage)
    }
}

/// Checkout result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: Option<OrderRecord>,
    pub error: Option<String>,
}

impl CheckoutResponse {
    pub fn success(order: OrderRecord) -> Self {
        Self {
            success: true,
            order: Some(order),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            order: None,
            error: Some(msg.into()),
        }
    }
}

/// Live price of a garage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub success: bool,
    /// Sum of catalog price times quantity.
    pub total: Option<i64>,
    /// Same with per-item discounts applied.
    pub discounted_total: Option<i64>,
    /// Whether current stock covers every line.
    pub in_stock: bool,
    pub error: Option<String>,
}

impl QuoteResponse {
    pub fn success(total: i64, discounted_total: i64, in_stock: bool) -> Self {
        Self {
            success: true,
            total: Some(total),
            discounted_total: Some(discounted_total),
            in_stock,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            total: None,
            discounted_total: None,
            in_stock: false,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// MAINTENANCE
// =============================================================================

/// `POST /cache/clear` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheClearResponse {
    pub success: bool,
    /// Entries dropped.
    pub cleared: usize,
}

/// `GET /validate` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub data: Option<String>, // Base64 encoded binary snapshot
    pub checksum: Option<String>,
    pub error: Option<String>,
}

impl ExportResponse {
    pub fn success(data: Vec<u8>, checksum: String) -> Self {
        Self {
            success: true,
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                &data,
            )),
            checksum: Some(checksum),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            checksum: None,
            error: Some(msg.into()),
        }
    }
}

/// BLAKE3 hash of the binary snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    pub algorithm: String,
    pub hash: String,
}
