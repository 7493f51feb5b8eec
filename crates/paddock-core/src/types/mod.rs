//! # Core Type Definitions
//!
//! This module contains all record types for the Paddock catalog engine:
//! - Identifiers (`CategoryId`, `ItemId`, `OwnerId`, `OrderId`)
//! - Catalog records (`CategoryNode`, `Item`, `Owner`)
//! - Order records (`LineItem`, `OrderRecord`, `Discount`)
//! - Frozen snapshots (`Frozen`)
//! - Error types (`ShopError`)
//!
//! ## Wire Names
//!
//! Field names follow the seed file produced by the shop front end, so a
//! few serde renames map the generic names used here onto the F1 ones
//! (`era_id`, `bolid_id`, `collector_id`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a category node (an F1 era).
    CategoryId
);
string_id!(
    /// Identifier of a catalog item (a bolid).
    ItemId
);
string_id!(
    /// Identifier of an owner (a collector).
    OwnerId
);
string_id!(
    /// Identifier of a finalized purchase order.
    OrderId
);

// =============================================================================
// CATALOG RECORDS
// =============================================================================

/// A node in the parent-linked era hierarchy.
///
/// `parent == None` marks a root era.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<CategoryId>,
}

impl CategoryNode {
    /// Create a new node.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            id: CategoryId::new(id),
            name: name.into(),
            parent: parent.map(CategoryId::from),
        }
    }

    /// Whether this node sits at the top of the hierarchy.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A catalog entry: one collectible race car.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub team: String,
    pub year: u16,
    /// Collector price in whole dollars.
    pub price: i64,
    #[serde(rename = "era_id")]
    pub category_id: CategoryId,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub quantity_available: u32,
    #[serde(default)]
    pub image_url: String,
}

impl Item {
    /// Create an item with no tags, no stock and no image.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        team: impl Into<String>,
        price: i64,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            team: team.into(),
            year: 0,
            price,
            category_id: CategoryId::new(category_id),
            tags: Vec::new(),
            quantity_available: 0,
            image_url: String::new(),
        }
    }

    /// Builder: set the model year.
    #[must_use]
    pub fn with_year(mut self, year: u16) -> Self {
        self.year = year;
        self
    }

    /// Builder: set the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set the available stock.
    #[must_use]
    pub fn with_stock(mut self, quantity: u32) -> Self {
        self.quantity_available = quantity;
        self
    }

    /// Check whether the item carries a tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A registered collector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
    /// Membership tier, e.g. "Paddock Club" or "Grandstand".
    pub tier: String,
}

impl Owner {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            id: OwnerId::new(id),
            name: name.into(),
            tier: tier.into(),
        }
    }
}

// =============================================================================
// ORDERS
// =============================================================================

/// One `(item, quantity)` pair inside an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "bolid_id")]
    pub item_id: ItemId,
    pub quantity: u32,
}

impl LineItem {
    #[must_use]
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: ItemId::new(item_id),
            quantity,
        }
    }
}

/// A finalized purchase.
///
/// `total_price` is frozen when the order is created and is never
/// recomputed, so it may drift from current catalog prices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    #[serde(rename = "collector_id")]
    pub owner_id: OwnerId,
    #[serde(rename = "items")]
    pub line_items: Vec<LineItem>,
    pub total_price: i64,
    /// ISO-8601 creation time.
    pub timestamp: String,
}

impl OrderRecord {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        line_items: Vec<LineItem>,
        total_price: i64,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: OrderId::new(id),
            owner_id: OwnerId::new(owner_id),
            line_items,
            total_price,
            timestamp: timestamp.into(),
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.line_items.iter().map(|l| l.quantity as u64).sum()
    }
}

/// A percentage discount on a single item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Discount {
    #[serde(rename = "bolid_id")]
    pub item_id: ItemId,
    /// Whole percent, 0..=100.
    pub percent: u8,
}

impl Discount {
    #[must_use]
    pub fn new(item_id: impl Into<String>, percent: u8) -> Self {
        Self {
            item_id: ItemId::new(item_id),
            percent: percent.min(100),
        }
    }
}

// =============================================================================
// FROZEN SNAPSHOTS
// =============================================================================

/// An immutable, cheaply clonable snapshot of a collection.
///
/// Equality and hashing are by value, so two snapshots built from equal
/// records compare equal even when they do not share storage. This is
/// the only collection type the sales ranker accepts as a cache key.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Frozen<T>(Arc<[T]>);

impl<T> Frozen<T> {
    /// Freeze a vector into a snapshot.
    #[must_use]
    pub fn new(records: Vec<T>) -> Self {
        Self(records.into())
    }

    /// An empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Whether two snapshots share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Frozen<T> {
    /// Build a new snapshot with one more record appended.
    ///
    /// The receiver is left untouched.
    #[must_use]
    pub fn with_appended(&self, record: T) -> Self {
        let mut records = self.0.to_vec();
        records.push(record);
        Self::new(records)
    }
}

impl<T> Clone for Frozen<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Frozen<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for Frozen<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for Frozen<T> {
    fn from(records: Vec<T>) -> Self {
        Self::new(records)
    }
}

impl<T> FromIterator<T> for Frozen<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: Serialize> Serialize for Frozen<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Frozen<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::new)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Paddock engine.
///
/// - No silent failures for operations the caller asked for explicitly
/// - Use `Result<T, ShopError>` for fallible operations
/// - The engine never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum ShopError {
    /// The requested item is not in the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// The requested era is not in the hierarchy.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// The requested collector is not registered.
    #[error("Owner not found: {0}")]
    OwnerNotFound(OwnerId),

    /// A garage with no items cannot be finalized.
    #[error("Garage is empty")]
    EmptyGarage,

    /// Quantities must be strictly positive.
    #[error("Invalid quantity {quantity} for item {item}")]
    InvalidQuantity { item: ItemId, quantity: u32 },

    /// A query parameter is out of range or malformed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Strict loading found dangling references or cycles.
    #[error("Catalog validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
