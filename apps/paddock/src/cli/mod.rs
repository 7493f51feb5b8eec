//! # Paddock CLI Module
//!
//! This module implements the CLI interface for Paddock.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show shop overview metrics
//! - `eras` - Show the era tree
//! - `items` - Browse the catalog with filters
//! - `top` - Show best-selling cars
//! - `checkout` - Place an order for a collector
//! - `validate` - Report dangling references and cycles
//! - `init` - Write the base era tree to a new seed file
//! - `export` - Export the catalog as JSON or binary snapshot
//! - `import` - Replace the seed file with a binary snapshot
//! - `hash` - Compute the BLAKE3 hash of the catalog

mod commands;

use crate::config::{CliOverrides, FileConfig, Settings};
use clap::{Parser, Subcommand};
use paddock_core::ShopError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Paddock - F1 collectible car shop
///
/// Browse eras and cars, rank best sellers and place orders against a
/// JSON seed file.
#[derive(Parser, Debug)]
#[command(name = "paddock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the seed file [default: data/seed.json]
    #[arg(short = 'D', long, global = true)]
    pub data: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to a TOML config file [default: ./paddock.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Fail on dangling references or era cycles instead of warning
    #[arg(long, global = true)]
    pub strict: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to [default: 127.0.0.1]
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to [default: 8080]
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show shop overview
    Status,

    /// Show the era tree
    Eras {
        /// Only show this era and its descendants
        #[arg(short, long)]
        root: Option<String>,
    },

    /// Browse the catalog
    Items {
        /// Keep cars anywhere under this era
        #[arg(short, long)]
        era: Option<String>,

        /// Minimum price (inclusive)
        #[arg(long)]
        min_price: Option<i64>,

        /// Maximum price (inclusive)
        #[arg(long)]
        max_price: Option<i64>,

        /// Keep cars built by this team
        #[arg(short, long)]
        team: Option<String>,

        /// Keep cars carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show best-selling cars
    Top {
        /// Number of cars to show [default: from config, else 10]
        #[arg(short)]
        k: Option<usize>,
    },

    /// Place an order for a collector
    Checkout {
        /// Collector id
        #[arg(short, long)]
        owner: String,

        /// Line as BOLID_ID:QUANTITY (repeatable)
        #[arg(short, long = "item", required = true, value_parser = parse_line)]
        items: Vec<(String, u32)>,
    },

    /// Report dangling references and era cycles
    Validate,

    /// Write the base era tree to a new seed file
    Init {
        /// Overwrite an existing seed file
        #[arg(short, long)]
        force: bool,
    },

    /// Export the catalog
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (json, binary)
        #[arg(short = 't', long, default_value = "json")]
        format: String,
    },

    /// Replace the seed file with a binary snapshot
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Compute BLAKE3 cryptographic hash of the catalog
    Hash,
}

/// Parse a `BOLID_ID:QUANTITY` checkout line.
pub fn parse_line(raw: &str) -> Result<(String, u32), String> {
    let (id, qty) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected BOLID_ID:QUANTITY, got '{}'", raw))?;
    if id.is_empty() {
        return Err(format!("missing bolid id in '{}'", raw));
    }
    let qty = qty
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", raw))?;
    Ok((id.to_string(), qty))
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ShopError> {
    let (host, port) = match &cli.command {
        Some(Commands::Server { host, port }) => (host.clone(), *port),
        _ => (None, None),
    };
    let overrides = CliOverrides {
        data: cli.data.clone(),
        strict: cli.strict,
        host,
        port,
    };
    let file = FileConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&overrides, &file)?;
    if cli.verbose {
        tracing::info!(?settings, "Resolved settings");
    }

    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { .. }) => cmd_server(&settings).await,
        Some(Commands::Status) => cmd_status(&settings, json_mode, cli.verbose),
        Some(Commands::Eras { root }) => cmd_eras(&settings, json_mode, root),
        Some(Commands::Items {
            era,
            min_price,
            max_price,
            team,
            tag,
        }) => {
            let filter = paddock_core::ItemFilter {
                era: era.map(paddock_core::CategoryId::new),
                min_price,
                max_price,
                team,
                tag,
            };
            cmd_items(&settings, json_mode, &filter)
        }
        Some(Commands::Top { k }) => cmd_top(&settings, json_mode, k),
        Some(Commands::Checkout { owner, items }) => {
            cmd_checkout(&settings, json_mode, &owner, &items)
        }
        Some(Commands::Validate) => cmd_validate(&settings, json_mode),
        Some(Commands::Init { force }) => cmd_init(&settings, force),
        Some(Commands::Export { output, format }) => cmd_export(&settings, &output, &format),
        Some(Commands::Import { input }) => cmd_import(&settings, &input),
        Some(Commands::Hash) => cmd_hash(&settings, json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(&settings, json_mode, cli.verbose)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
