//! # CLI Command Implementations
//!
//! Every command loads the catalog named by the resolved settings, does its
//! work and prints either a human listing or JSON (`--json-mode`).

use crate::{api, config::Settings, store};
use paddock_core::{
    CategoryId, Garage, Item, ItemFilter, ShopError, base_seed, seed_to_json, snapshot_checksum,
    snapshot_to_bytes,
};
use std::path::Path;

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_items(items: &[Item]) {
    for item in items {
        println!(
            "  {:<12} {:<28} {:<14} {:>4} ${:>10}  stock {}",
            item.id, item.name, item.team, item.year, item.price, item.quantity_available
        );
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(settings: &Settings) -> Result<(), ShopError> {
    let catalog = store::load_catalog(settings)?;

    println!("Paddock Shop Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:      {}", settings.host);
    println!("  Port:      {}", settings.port);
    println!("  Seed:      {}", settings.data_path.display());
    println!("  Strict:    {}", settings.strict);
    println!("  Cache:     {} entries", settings.cache_capacity);
    println!();
    println!("Endpoints:");
    println!("  GET  /health           - Health check");
    println!("  GET  /status           - Shop overview");
    println!("  GET  /eras             - Flattened era tree");
    println!("  POST /items/query      - Filtered catalog");
    println!("  GET  /top              - Best sellers");
    println!("  POST /garage/quote     - Price a garage");
    println!("  POST /garage/checkout  - Place an order");
    println!("  POST /cache/clear      - Drop ranker cache");
    println!("  GET  /validate         - Structural issues");
    println!("  POST /export           - Binary snapshot");
    println!("  GET  /hash             - Snapshot BLAKE3 hash");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = api::AppState::new(catalog)
        .with_data_path(settings.data_path.clone())
        .with_default_k(settings.default_k);
    let addr = format!("{}:{}", settings.host, settings.port);
    api::run_server(&addr, state).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show shop overview.
pub fn cmd_status(settings: &Settings, json_mode: bool, verbose: bool) -> Result<(), ShopError> {
    let catalog = store::load_catalog(settings)?;
    let metrics = catalog.metrics();

    if json_mode {
        let mut output = serde_json::json!({
            "seed": settings.data_path.to_string_lossy(),
            "metrics": metrics,
        });
        if verbose {
            let teams = paddock_core::teams(catalog.items());
            output["teams"] = serde_json::json!(teams);
        }
        print_json(&output);
        return Ok(());
    }

    println!("Paddock Shop Status");
    println!("===================");
    println!("Seed: {}", settings.data_path.display());
    println!();
    println!("Collectors:    {}", metrics.owner_count);
    println!("Cars:          {}", metrics.item_count);
    println!("Orders:        {}", metrics.order_count);
    println!("Market Volume: ${}", metrics.market_volume);
    println!(
        "Eras:          {} ({} top-level)",
        metrics.era_count, metrics.root_era_count
    );

    if verbose {
        println!();
        println!("Teams:");
        for team in paddock_core::teams(catalog.items()) {
            println!("  {}", team);
        }
    }

    Ok(())
}

// =============================================================================
// CATALOG COMMANDS
// =============================================================================

/// Show the era tree, indented by depth.
pub fn cmd_eras(settings: &Settings, json_mode: bool, root: Option<String>) -> Result<(), ShopError> {
    let catalog = store::load_catalog(settings)?;
    let root = root.map(CategoryId::new);

    if let Some(id) = &root
        && !catalog.eras().iter().any(|e| &e.id == id)
    {
        return Err(ShopError::CategoryNotFound(id.clone()));
    }

    let tree = api::era_tree(catalog.eras(), root.as_ref());

    if json_mode {
        print_json(&serde_json::json!({ "eras": tree }));
        return Ok(());
    }

    for era in &tree {
        println!("{}{} ({})", "  ".repeat(era.depth), era.name, era.id);
    }
    if tree.is_empty() {
        println!("No eras.");
    }

    Ok(())
}

/// Browse the catalog.
pub fn cmd_items(settings: &Settings, json_mode: bool, filter: &ItemFilter) -> Result<(), ShopError> {
    let catalog = store::load_catalog(settings)?;
    let items: Vec<Item> = catalog.browse(filter).into_iter().cloned().collect();

    if json_mode {
        print_json(&serde_json::json!(api::ItemsResponse::new(items)));
        return Ok(());
    }

    println!("{} car(s)", items.len());
    print_items(&items);
    Ok(())
}

/// Show best sellers, most sold first.
pub fn cmd_top(settings: &Settings, json_mode: bool, k: Option<usize>) -> Result<(), ShopError> {
    let catalog = store::load_catalog(settings)?;
    let k = k.unwrap_or(settings.default_k);
    let items = catalog.top_sellers(k)?;

    if json_mode {
        print_json(&serde_json::json!(api::TopResponse::success(k, items.to_vec())));
        return Ok(());
    }

    println!("Top {} Sellers", k);
    println!("==============");
    if items.is_empty() {
        println!("No sales yet.");
    }
    print_items(&items);
    Ok(())
}

// =============================================================================
// CHECKOUT COMMAND
// =============================================================================

/// Place an order and write it back to the seed file.
pub fn cmd_checkout(
    settings: &Settings,
    json_mode: bool,
    owner: &str,
    items: &[(String, u32)],
) -> Result<(), ShopError> {
    let mut catalog = store::load_catalog(settings)?;

    let mut garage = Garage::new(owner);
    for (item_id, quantity) in items {
        garage.add(item_id.as_str(), *quantity)?;
    }

    let order = catalog.checkout(&garage, crate::timestamp_now())?;
    store::write_seed(&settings.data_path, &catalog.to_seed())?;
    tracing::info!(order = %order.id, total = order.total_price, "Order placed");

    if json_mode {
        print_json(&serde_json::json!(api::CheckoutResponse::success(order)));
        return Ok(());
    }

    println!("Order {} for {}", order.id, order.owner_id);
    for line in &order.line_items {
        println!("  {} x{}", line.item_id, line.quantity);
    }
    println!("Total: ${}", order.total_price);
    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Report structural issues. Fails when any are found.
pub fn cmd_validate(settings: &Settings, json_mode: bool) -> Result<(), ShopError> {
    // Load leniently so every issue can be listed.
    let lenient = Settings {
        strict: false,
        ..settings.clone()
    };
    let catalog = store::load_catalog(&lenient)?;
    let issues: Vec<String> = catalog.validate().iter().map(ToString::to_string).collect();

    if json_mode {
        print_json(&serde_json::json!(api::ValidateResponse {
            valid: issues.is_empty(),
            issues: issues.clone(),
        }));
    } else if issues.is_empty() {
        println!("Catalog OK");
    } else {
        println!("{} issue(s):", issues.len());
        for issue in &issues {
            println!("  - {}", issue);
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ShopError::ValidationFailed(issues))
    }
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write the base era tree to a new seed file.
pub fn cmd_init(settings: &Settings, force: bool) -> Result<(), ShopError> {
    let path = &settings.data_path;
    if path.exists() && !force {
        return Err(ShopError::IoError(format!(
            "Seed file {} already exists. Use --force to overwrite.",
            path.display()
        )));
    }

    store::write_seed(path, &base_seed())?;
    println!("Initialized seed file at {}", path.display());
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export the catalog as a JSON seed or a binary snapshot.
pub fn cmd_export(settings: &Settings, output: &Path, format: &str) -> Result<(), ShopError> {
    let validated_output = store::validate_output_path(output)?;
    let seed = store::load_catalog(settings)?.to_seed();

    let data = match format {
        "json" => seed_to_json(&seed)?.into_bytes(),
        "binary" => {
            let data = snapshot_to_bytes(&seed)?;
            println!("Checksum: {}", snapshot_checksum(&seed)?);
            data
        }
        other => {
            return Err(ShopError::InvalidQuery(format!(
                "Unknown format: {}. Use: json, binary",
                other
            )));
        }
    };

    std::fs::write(&validated_output, &data)
        .map_err(|e| ShopError::IoError(format!("Write file: {}", e)))?;

    println!(
        "Exported {} bytes to {}",
        data.len(),
        validated_output.display()
    );
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Replace the seed file with the contents of a binary snapshot.
pub fn cmd_import(settings: &Settings, input: &Path) -> Result<(), ShopError> {
    let seed = store::read_snapshot(input)?;
    let catalog = store::catalog_from_seed(seed, settings)?;
    store::write_seed(&settings.data_path, &catalog.to_seed())?;

    let metrics = catalog.metrics();
    println!(
        "Imported {} cars, {} eras, {} orders into {}",
        metrics.item_count,
        metrics.era_count,
        metrics.order_count,
        settings.data_path.display()
    );
    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Print the BLAKE3 hash of the catalog's binary snapshot.
pub fn cmd_hash(settings: &Settings, json_mode: bool) -> Result<(), ShopError> {
    let seed = store::load_catalog(settings)?.to_seed();
    let hash = snapshot_checksum(&seed)?;

    if json_mode {
        print_json(&serde_json::json!(api::HashResponse {
            algorithm: "blake3".to_string(),
            hash,
        }));
    } else {
        println!("{}", hash);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
