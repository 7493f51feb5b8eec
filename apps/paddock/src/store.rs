//! # Seed Storage
//!
//! File I/O for seed files and binary snapshots. The core only encodes and
//! decodes bytes; reading and writing them happens here.

use crate::config::Settings;
use paddock_core::{
    Catalog, SeedData, ShopError, base_seed, primitives::MAX_SEED_SIZE,
    formats::MAX_SNAPSHOT_PAYLOAD_SIZE, seed_from_json, seed_to_json, snapshot_from_bytes,
};
use std::io::Write;
use std::path::{Path, PathBuf};

// =============================================================================
// PATH CHECKS
// =============================================================================

/// Reject files larger than `max_size` before reading them.
pub fn validate_file_size(path: &Path, max_size: usize) -> Result<(), ShopError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ShopError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size as u64 {
        return Err(ShopError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path, requiring an existing regular file.
///
/// Canonicalizing resolves `..` and symlinks before anything is read.
pub fn validate_file_path(path: &Path) -> Result<PathBuf, ShopError> {
    let canonical = path.canonicalize().map_err(|e| {
        ShopError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ShopError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path whose parent directory must already exist.
pub fn validate_output_path(path: &Path) -> Result<PathBuf, ShopError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ShopError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ShopError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ShopError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// SEED FILES
// =============================================================================

/// Read and parse a seed file.
pub fn read_seed(path: &Path) -> Result<SeedData, ShopError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_SEED_SIZE)?;
    let bytes = std::fs::read(&path)
        .map_err(|e| ShopError::IoError(format!("Read seed '{}': {}", path.display(), e)))?;
    seed_from_json(&bytes)
}

/// Write a seed file, creating its directory if needed.
///
/// The JSON goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers see either the old or the new seed.
pub fn write_seed(path: &Path, seed: &SeedData) -> Result<(), ShopError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        ShopError::IoError(format!("Create directory '{}': {}", dir.display(), e))
    })?;

    let json = seed_to_json(seed)?;
    let mut staged = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| ShopError::IoError(format!("Stage seed in '{}': {}", dir.display(), e)))?;
    staged
        .write_all(json.as_bytes())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| ShopError::IoError(format!("Write seed '{}': {}", path.display(), e)))?;
    staged
        .persist(path)
        .map_err(|e| ShopError::IoError(format!("Replace seed '{}': {}", path.display(), e)))?;
    Ok(())
}

/// Read a binary snapshot file.
pub fn read_snapshot(path: &Path) -> Result<SeedData, ShopError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_SNAPSHOT_PAYLOAD_SIZE)?;
    let bytes = std::fs::read(&path)
        .map_err(|e| ShopError::IoError(format!("Read snapshot '{}': {}", path.display(), e)))?;
    snapshot_from_bytes(&bytes)
}

// =============================================================================
// CATALOG LOADING
// =============================================================================

/// Build a catalog from a seed, honouring strict mode and cache size.
pub fn catalog_from_seed(seed: SeedData, settings: &Settings) -> Result<Catalog, ShopError> {
    if settings.strict {
        Catalog::from_seed_strict(seed, settings.cache_capacity)
    } else {
        Ok(Catalog::with_cache_capacity(seed, settings.cache_capacity))
    }
}

/// Load the catalog named by the settings.
///
/// A missing seed file is not an error: the shop starts from the base era
/// tree until `paddock init` writes one.
pub fn load_catalog(settings: &Settings) -> Result<Catalog, ShopError> {
    let seed = if settings.data_path.exists() {
        read_seed(&settings.data_path)?
    } else {
        tracing::warn!(
            "Seed file {} not found, starting from the base era tree",
            settings.data_path.display()
        );
        base_seed()
    };

    let catalog = catalog_from_seed(seed, settings)?;
    if !settings.strict {
        for issue in catalog.validate() {
            tracing::warn!("Catalog issue: {}", issue);
        }
    }

    tracing::info!(
        items = catalog.items().len(),
        eras = catalog.eras().len(),
        orders = catalog.orders().len(),
        "Catalog loaded from {}",
        settings.data_path.display()
    );
    Ok(catalog)
}

// =============================================================================
// TESTS
// =============================================================================
