//! # Engine Primitives
//!
//! Hardcoded runtime constants for the Paddock engine.
//!
//! These are compiled into the binary and are immutable at runtime.
//! The app layer may override the tunable ones (cache capacity, default K)
//! through its configuration, but never beyond the hard limits below.

/// Default number of distinct `(orders, items, k)` combinations the sales
/// ranker remembers before evicting the least recently used one.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Default K for top-seller queries when the caller does not pass one.
pub const DEFAULT_TOP_K: usize = 10;

/// Upper bound on K accepted at the API boundary.
pub const MAX_TOP_K: usize = 1000;

/// Magic bytes for the binary catalog snapshot header.
///
/// - File Header = Magic Bytes ("PDCK") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"PDCK";

/// Current binary snapshot format version.
///
/// Increment this when making breaking changes to the snapshot layout.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a JSON seed file (32 MB).
pub const MAX_SEED_SIZE: usize = 32 * 1024 * 1024;

/// Maximum number of lines in a single checkout.
pub const MAX_CHECKOUT_LINES: usize = 256;

/// Maximum quantity of a single item in one garage line.
pub const MAX_LINE_QUANTITY: u32 = 10_000;
