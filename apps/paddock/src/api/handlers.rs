//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        CacheClearResponse, CheckoutResponse, ErasQuery, ErasResponse, ExportResponse,
        GarageRequest, HashResponse, HealthResponse, ItemsResponse, QuoteResponse,
        StatusResponse, TopQuery, TopResponse, ValidateResponse,
    },
};
use crate::store;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use paddock_core::{
    CategoryId, Catalog, Garage, ItemFilter, OrderId, ShopError, discounted_price,
    snapshot_checksum, snapshot_to_bytes,
};

/// HTTP status for a core error.
pub fn error_status(error: &ShopError) -> StatusCode {
    match error {
        ShopError::ItemNotFound(_)
        | ShopError::CategoryNotFound(_)
        | ShopError::OwnerNotFound(_) => StatusCode::NOT_FOUND,
        ShopError::EmptyGarage
        | ShopError::InvalidQuantity { .. }
        | ShopError::InvalidQuery(_)
        | ShopError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        ShopError::SerializationError(_)
        | ShopError::DeserializationError(_)
        | ShopError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get shop overview metrics.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog.read().await;
    let metrics = catalog.metrics();
    let cache = catalog.cache_stats();

    let response = StatusResponse {
        owner_count: metrics.owner_count,
        item_count: metrics.item_count,
        order_count: metrics.order_count,
        market_volume: metrics.market_volume,
        era_count: metrics.era_count,
        root_era_count: metrics.root_era_count,
        cache_entries: cache.len,
        cache_hits: cache.hits,
        cache_misses: cache.misses,
    };

    (StatusCode::OK, Json(response))
}

// =============================================================================
// CATALOG HANDLERS
// =============================================================================

/// Flattened era tree under `?root=`, or every root era.
pub async fn eras_handler(
    State(state): State<AppState>,
    Query(query): Query<ErasQuery>,
) -> impl IntoResponse {
    let catalog = state.catalog.read().await;
    let root = query.root.map(CategoryId::new);

    if let Some(id) = &root
        && !catalog.eras().iter().any(|e| &e.id == id)
    {
        let e = ShopError::CategoryNotFound(id.clone());
        return (error_status(&e), e.to_string()).into_response();
    }

    let flattened = catalog.flatten(root.as_ref());
    (StatusCode::OK, Json(ErasResponse::from_flattened(&flattened))).into_response()
}

/// Catalog page filter: era closure, price range, team, tag.
pub async fn items_query_handler(
    State(state): State<AppState>,
    Json(filter): Json<ItemFilter>,
) -> impl IntoResponse {
    let catalog = state.catalog.read().await;
    let items = catalog.browse(&filter).into_iter().cloned().collect();

    (StatusCode::OK, Json(ItemsResponse::new(items)))
}

/// Best sellers. `k` defaults to the configured default.
pub async fn top_handler(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> impl IntoResponse {
    let k = query.k.unwrap_or(state.default_k);
    let catalog = state.catalog.read().await;

    match catalog.top_sellers(k) {
        Ok(items) => (StatusCode::OK, Json(TopResponse::success(k, items.to_vec()))),
        Err(e) => (error_status(&e), Json(TopResponse::error(k, e.to_string()))),
    }
}

// =============================================================================
// GARAGE HANDLERS
// =============================================================================

/// Finalize a garage into a new order.
///
/// When the server was started with a seed path, the updated catalog is
/// written back to it before the write lock is released, so seed writes
/// land one at a time and in order.
pub async fn checkout_handler(
    State(state): State<AppState>,
    Json(request): Json<GarageRequest>,
) -> impl IntoResponse {
    let garage = match request.to_garage() {
        Ok(g) => g,
        Err(e) => {
            return (
                error_status(&e),
                Json(CheckoutResponse::error(e.to_string())),
            );
        }
    };

    let mut catalog = state.catalog.write().await;
    let order = match catalog.checkout(&garage, crate::timestamp_now()) {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!("Checkout rejected: {}", e);
            return (
                error_status(&e),
                Json(CheckoutResponse::error(e.to_string())),
            );
        }
    };

    tracing::info!(
        order = %order.id,
        collector = %order.owner_id,
        total = order.total_price,
        "Order placed"
    );

    if let Some(path) = state.data_path.clone() {
        let seed = catalog.to_seed();
        let written = tokio::task::spawn_blocking(move || store::write_seed(&path, &seed))
            .await
            .map_err(|e| ShopError::IoError(format!("Persist task failed: {}", e)))
            .and_then(|r| r);
        if let Err(e) = written {
            tracing::error!("Failed to persist order {}: {}", order.id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CheckoutResponse::error(format!(
                    "Order {} placed but not persisted: {}",
                    order.id, e
                ))),
            );
        }
    }
    drop(catalog);

    (StatusCode::OK, Json(CheckoutResponse::success(order)))
}

/// Live price of a garage, with and without discounts.
pub async fn quote_handler(
    State(state): State<AppState>,
    Json(request): Json<GarageRequest>,
) -> impl IntoResponse {
    let catalog = state.catalog.read().await;
    match request.to_garage().and_then(|g| quote(&catalog, &g)) {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => (error_status(&e), Json(QuoteResponse::error(e.to_string()))),
    }
}

fn quote(catalog: &Catalog, garage: &Garage) -> Result<QuoteResponse, ShopError> {
    let order = garage.finalize(catalog.items(), OrderId::new("quote"), "")?;

    let validated = catalog.check_order(&order).into_option();
    let in_stock = validated.is_some();

    let discount_of = |item_id: &paddock_core::ItemId| {
        catalog
            .discounts()
            .iter()
            .find(|d| &d.item_id == item_id)
            .map_or(0, |d| d.percent)
    };

    let mut discounted_total = 0i64;
    for line in garage.lines() {
        let item = catalog
            .find_item(&line.item_id)
            .ok_or_else(|| ShopError::ItemNotFound(line.item_id.clone()))?;
        let unit = discounted_price(item.price, discount_of(&line.item_id));
        discounted_total = discounted_total.saturating_add(unit.saturating_mul(line.quantity as i64));
    }

    Ok(QuoteResponse::success(
        order.total_price,
        discounted_total,
        in_stock,
    ))
}

// =============================================================================
// MAINTENANCE HANDLERS
// =============================================================================

/// Drop all cached top-seller results.
pub async fn cache_clear_handler(State(state): State<AppState>) -> impl IntoResponse {
    let cleared = state.catalog.read().await.clear_cache();
    tracing::info!("Ranker cache cleared ({} entries)", cleared);

    (
        StatusCode::OK,
        Json(CacheClearResponse {
            success: true,
            cleared,
        }),
    )
}

/// Structural problems in the loaded data.
pub async fn validate_handler(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog.read().await;
    let issues: Vec<String> = catalog.validate().iter().map(ToString::to_string).collect();

    (
        StatusCode::OK,
        Json(ValidateResponse {
            valid: issues.is_empty(),
            issues,
        }),
    )
}

/// Export the catalog as a base64 binary snapshot.
pub async fn export_handler(State(state): State<AppState>) -> impl IntoResponse {
    let seed = state.catalog.read().await.to_seed();

    let exported = snapshot_to_bytes(&seed)
        .and_then(|bytes| snapshot_checksum(&seed).map(|checksum| (bytes, checksum)));
    match exported {
        Ok((data, checksum)) => (StatusCode::OK, Json(ExportResponse::success(data, checksum))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ExportResponse::error(format!("Export failed: {}", e))),
        ),
    }
}

/// BLAKE3 hash of the binary snapshot.
pub async fn hash_handler(State(state): State<AppState>) -> impl IntoResponse {
    let seed = state.catalog.read().await.to_seed();

    match snapshot_checksum(&seed) {
        Ok(hash) => (
            StatusCode::OK,
            Json(HashResponse {
                algorithm: "blake3".to_string(),
                hash,
            }),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
