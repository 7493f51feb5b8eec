//! # Binary Snapshot
//!
//! Compact binary encoding of a whole catalog.
//!
//! Format: Header (5 bytes) + postcard-serialized [`SeedData`].
//! - 4 bytes: Magic ("PDCK")
//! - 1 byte: Version
//!
//! Size and header are validated before the payload is decoded, so
//! corrupted or hostile input fails fast without large allocations.

use super::seed::SeedData;
use crate::{ShopError, primitives};

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum accepted snapshot size (64 MB).
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 64 * 1024 * 1024;

const HEADER_LEN: usize = 5;

// =============================================================================
// HEADER
// =============================================================================

/// The header that precedes every snapshot payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Header for the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), ShopError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(ShopError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(ShopError::DeserializationError(format!(
                "Unsupported snapshot version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ShopError> {
        let header = bytes.get(..HEADER_LEN).ok_or_else(|| {
            ShopError::DeserializationError("Header too short".to_string())
        })?;
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[0..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Encode a catalog as header + postcard payload.
pub fn snapshot_to_bytes(seed: &SeedData) -> Result<Vec<u8>, ShopError> {
    let payload =
        postcard::to_stdvec(seed).map_err(|e| ShopError::SerializationError(e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&SnapshotHeader::new().to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a snapshot produced by [`snapshot_to_bytes`].
pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<SeedData, ShopError> {
    if bytes.len() < HEADER_LEN {
        return Err(ShopError::DeserializationError(format!(
            "Data too short: minimum {} bytes required",
            HEADER_LEN
        )));
    }
    if bytes.len() > MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(ShopError::DeserializationError(format!(
            "Snapshot size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    SnapshotHeader::from_bytes(bytes)?.validate()?;

    postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(|e| {
        ShopError::DeserializationError(format!("Failed to decode snapshot payload: {}", e))
    })
}

/// BLAKE3 checksum of the binary snapshot, hex encoded.
///
/// Two catalogs with equal contents always hash the same, since the
/// postcard encoding is deterministic for a given record order.
#[cfg(feature = "crypto-hash")]
pub fn snapshot_checksum(seed: &SeedData) -> Result<String, ShopError> {
    let bytes = snapshot_to_bytes(seed)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// =============================================================================
// TESTS
// =============================================================================
