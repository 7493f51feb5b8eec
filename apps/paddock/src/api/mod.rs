//! # Paddock HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Shop overview metrics and cache counters
//! - `GET /eras?root=` - Flattened era tree
//! - `POST /items/query` - Filter the catalog
//! - `GET /top?k=` - Best-selling cars
//! - `POST /garage/checkout` - Place an order
//! - `POST /garage/quote` - Price a garage without ordering
//! - `POST /cache/clear` - Drop cached top-seller results
//! - `GET /validate` - Report dangling references and cycles
//! - `POST /export` - Binary snapshot, base64 encoded
//! - `GET /hash` - BLAKE3 hash of the binary snapshot
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `PADDOCK_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `PADDOCK_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `PADDOCK_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::get_api_key_from_env;
pub use handlers::error_status;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    CacheClearResponse, CheckoutResponse, EraJson, ErasQuery, ErasResponse, ExportResponse,
    GarageLine, GarageRequest, HashResponse, HealthResponse, ItemsResponse, QuoteResponse,
    StatusResponse, TopQuery, TopResponse, ValidateResponse, era_tree, with_depths,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use paddock_core::{Catalog, ShopError, primitives::DEFAULT_TOP_K};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the catalog.
#[derive(Clone)]
pub struct AppState {
    /// The loaded shop.
    pub catalog: Arc<RwLock<Catalog>>,
    /// Seed file rewritten after every checkout. `None` keeps orders in memory.
    pub data_path: Option<PathBuf>,
    /// K used by `GET /top` when the query omits it.
    pub default_k: usize,
}

impl AppState {
    /// Create in-memory app state around a catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            data_path: None,
            default_k: DEFAULT_TOP_K,
        }
    }

    /// Persist checkouts to `path`.
    #[must_use]
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_default_k(mut self, k: usize) -> Self {
        self.default_k = k;
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Origins allowed when `PADDOCK_CORS_ORIGINS` is unset or unusable.
const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

/// Build CORS layer from `PADDOCK_CORS_ORIGINS`.
///
/// `*` allows any origin. Otherwise the value is a comma-separated origin
/// list; entries that are not valid header values are skipped.
fn build_cors_layer() -> CorsLayer {
    let configured = std::env::var("PADDOCK_CORS_ORIGINS").ok();

    if configured.as_deref() == Some("*") {
        tracing::warn!("CORS: PADDOCK_CORS_ORIGINS=* allows every origin");
        return CorsLayer::permissive();
    }

    let mut origins: Vec<HeaderValue> = configured
        .iter()
        .flat_map(|raw| raw.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("CORS: skipping origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::info!("CORS: restricted to localhost");
        origins = LOCAL_ORIGINS
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
    } else {
        tracing::info!("CORS: {} configured origin(s)", origins.len());
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing
/// 2. CORS
/// 3. Body limit (2 MB)
/// 4. Rate limiting, if enabled
/// 5. API key authentication, if configured
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    // Check if rate limiting is enabled
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    // Check if authentication is enabled
    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "⚠️  API key authentication DISABLED - all endpoints are publicly accessible! \
             Set PADDOCK_API_KEY environment variable to enable authentication."
        );
    }

    // Build base router with routes
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/eras", get(handlers::eras_handler))
        .route("/items/query", post(handlers::items_query_handler))
        .route("/top", get(handlers::top_handler))
        .route("/garage/checkout", post(handlers::checkout_handler))
        .route("/garage/quote", post(handlers::quote_handler))
        .route("/cache/clear", post(handlers::cache_clear_handler))
        .route("/validate", get(handlers::validate_handler))
        .route("/export", post(handlers::export_handler))
        .route("/hash", get(handlers::hash_handler));

    // Apply authentication middleware (innermost - runs last on request)
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), ShopError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ShopError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Paddock HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ShopError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
