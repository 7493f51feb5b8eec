//! # paddock
//!
//! Application layer for the Paddock shop: CLI, HTTP API, configuration
//! and seed file storage around the pure `paddock-core` engine.

pub mod api;
pub mod cli;
pub mod config;
pub mod store;

/// Current UTC time as an ISO-8601 timestamp, second precision.
///
/// Used to stamp new orders.
pub fn timestamp_now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
