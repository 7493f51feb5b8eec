//! # Formats
//!
//! Pure byte-level encodings of a catalog snapshot. File I/O lives in the
//! app layer.
//!
//! - `seed`: the human-edited JSON seed file
//! - `snapshot`: the compact binary snapshot (`PDCK` header + postcard)

pub mod seed;
pub mod snapshot;

pub use seed::{SeedData, base_seed, seed_from_json, seed_to_json};
#[cfg(feature = "crypto-hash")]
pub use snapshot::snapshot_checksum;
pub use snapshot::{
    MAX_SNAPSHOT_PAYLOAD_SIZE, SnapshotHeader, snapshot_from_bytes, snapshot_to_bytes,
};
