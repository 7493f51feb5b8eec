//! # Paddock - F1 Collectible Car Shop
//!
//! The main binary for the Paddock shop.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for catalog, ranking and checkout operations
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │               apps/paddock (THE BINARY)           │
//! │                                                   │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────┐  │
//! │  │   CLI       │   │   HTTP API  │   │  Store  │  │
//! │  │  (clap)     │   │   (axum)    │   │ (files) │  │
//! │  └──────┬──────┘   └──────┬──────┘   └────┬────┘  │
//! │         └─────────────────┼───────────────┘       │
//! │                           ▼                       │
//! │                   ┌───────────────┐               │
//! │                   │ paddock-core  │               │
//! │                   │ (THE LOGIC)   │               │
//! │                   └───────────────┘               │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! paddock server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! paddock init
//! paddock eras --root era_v10
//! paddock top -k 5
//! paddock checkout -o coll_1 --item bolid_1:1
//! ```

use clap::Parser;
use paddock::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // PADDOCK_LOG_FORMAT=json switches to machine-parseable output.
    let log_format = std::env::var("PADDOCK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "paddock=info,paddock_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r#"
  ┌─┐┌─┐┌┬┐┌┬┐┌─┐┌─┐┬┌─
  ├─┘├─┤ ││ │││ ││  ├┴┐
  ┴  ┴ ┴─┴┘─┴┘└─┘└─┘┴ ┴

  F1 Collectible Car Shop v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
