//! Integration tests for the Paddock HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
// Allow holding MutexGuard across await in auth tests - tests are serialized
// intentionally to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use paddock::api::{
    AppState, CacheClearResponse, CheckoutResponse, ErasResponse, ExportResponse, GarageLine,
    GarageRequest, HashResponse, HealthResponse, ItemsResponse, QuoteResponse, StatusResponse,
    TopResponse, ValidateResponse, create_router,
};
use paddock_core::{
    Catalog, Discount, Item, LineItem, OrderRecord, Owner, SeedData, base_seed,
    snapshot_from_bytes,
};
use serde_json::json;
use std::sync::Mutex;

/// Mutex to serialize tests since auth tests modify env vars.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and ensures cleanup on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var("PADDOCK_API_KEY") };
    }
}

fn lock() -> TestGuard {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var("PADDOCK_API_KEY") };
    TestGuard { _guard: guard }
}

/// Base eras, three cars, two collectors and two past orders.
///
/// Units sold: bolid_2 = 3, bolid_1 = 1, bolid_3 = 0.
fn shop_seed() -> SeedData {
    let mut seed = base_seed();
    seed.items = vec![
        Item::new("bolid_1", "F2004", "Ferrari", 4_700_000, "era_v10_late")
            .with_year(2004)
            .with_tags(["champion"])
            .with_stock(2),
        Item::new("bolid_2", "MP4/13", "McLaren", 2_500_000, "era_v10_early")
            .with_year(1998)
            .with_stock(3),
        Item::new("bolid_3", "W11", "Mercedes", 6_000_000, "era_hybrid_wide")
            .with_year(2020)
            .with_tags(["champion"])
            .with_stock(1),
    ];
    seed.owners = vec![
        Owner::new("coll_1", "Anna", "Paddock Club"),
        Owner::new("coll_2", "Boris", "Grandstand"),
    ];
    seed.orders = vec![
        OrderRecord::new(
            "order_1",
            "coll_2",
            vec![LineItem::new("bolid_2", 3)],
            7_500_000,
            "2024-03-01T10:00:00",
        ),
        OrderRecord::new(
            "order_2",
            "coll_1",
            vec![LineItem::new("bolid_1", 1)],
            4_700_000,
            "2024-04-01T10:00:00",
        ),
    ];
    seed.discounts = vec![Discount::new("bolid_1", 10)];
    seed
}

fn create_test_server() -> (TestServer, TestGuard) {
    let guard = lock();
    let state = AppState::new(Catalog::from_seed(base_seed()));
    (TestServer::new(create_router(state)).unwrap(), guard)
}

fn create_populated_test_server() -> (TestServer, TestGuard) {
    let guard = lock();
    let state = AppState::new(Catalog::from_seed(shop_seed()));
    (TestServer::new(create_router(state)).unwrap(), guard)
}

fn garage(collector: &str, lines: &[(&str, u32)]) -> GarageRequest {
    GarageRequest {
        collector_id: collector.to_string(),
        items: lines
            .iter()
            .map(|(id, quantity)| GarageLine {
                bolid_id: id.to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

// =============================================================================
// HEALTH AND STATUS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_base_tree() {
    let (server, _guard) = create_test_server();

    let response = server.get("/status").await;

    response.assert_status_ok();
    let status: StatusResponse = response.json();
    assert_eq!(status.item_count, 0);
    assert_eq!(status.order_count, 0);
    assert_eq!(status.era_count, 8);
    assert_eq!(status.root_era_count, 3);
    assert_eq!(status.market_volume, 0);
}

#[tokio::test]
async fn test_status_populated_shop() {
    let (server, _guard) = create_populated_test_server();

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.item_count, 3);
    assert_eq!(status.owner_count, 2);
    assert_eq!(status.order_count, 2);
    assert_eq!(status.market_volume, 12_200_000);
}

// =============================================================================
// ERAS AND ITEMS
// =============================================================================

#[tokio::test]
async fn test_eras_lists_all_roots() {
    let (server, _guard) = create_test_server();

    let response = server.get("/eras").await;

    response.assert_status_ok();
    let eras: ErasResponse = response.json();
    assert_eq!(eras.eras.len(), 8);
    assert_eq!(eras.eras[0].id, "era_v10");
    assert_eq!(eras.eras[0].depth, 0);
    assert_eq!(eras.eras.iter().filter(|e| e.depth == 0).count(), 3);
}

#[tokio::test]
async fn test_eras_under_root_is_preorder() {
    let (server, _guard) = create_test_server();

    let eras: ErasResponse = server.get("/eras?root=era_hybrid").await.json();
    let listed: Vec<(&str, usize)> = eras
        .eras
        .iter()
        .map(|e| (e.id.as_str(), e.depth))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("era_hybrid", 0),
            ("era_hybrid_early", 1),
            ("era_hybrid_wide", 1),
            ("era_ground_effect", 1),
        ]
    );
}

#[tokio::test]
async fn test_eras_unknown_root_returns_404() {
    let (server, _guard) = create_test_server();

    let response = server.get("/eras?root=era_turbo").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_items_query_by_era_closure() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/items/query")
        .json(&json!({ "era": "era_v10" }))
        .await;

    response.assert_status_ok();
    let items: ItemsResponse = response.json();
    assert_eq!(items.count, 2);
    assert_eq!(ids(&items.items), vec!["bolid_1", "bolid_2"]);
}

#[tokio::test]
async fn test_items_query_combined_filters() {
    let (server, _guard) = create_populated_test_server();

    let items: ItemsResponse = server
        .post("/items/query")
        .json(&json!({ "tag": "champion", "min_price": 5_000_000 }))
        .await
        .json();
    assert_eq!(ids(&items.items), vec!["bolid_3"]);

    let everything: ItemsResponse = server.post("/items/query").json(&json!({})).await.json();
    assert_eq!(everything.count, 3);
}

// =============================================================================
// TOP SELLERS
// =============================================================================

#[tokio::test]
async fn test_top_sellers_skip_unsold() {
    let (server, _guard) = create_populated_test_server();

    let response = server.get("/top").await;

    response.assert_status_ok();
    let top: TopResponse = response.json();
    assert!(top.success);
    assert_eq!(top.k, 10);
    assert_eq!(ids(&top.items), vec!["bolid_2", "bolid_1"]);
}

#[tokio::test]
async fn test_top_sellers_truncates_to_k() {
    let (server, _guard) = create_populated_test_server();

    let top: TopResponse = server.get("/top?k=1").await.json();
    assert_eq!(ids(&top.items), vec!["bolid_2"]);

    let none: TopResponse = server.get("/top?k=0").await.json();
    assert!(none.items.is_empty());
}

#[tokio::test]
async fn test_top_sellers_rejects_huge_k() {
    let (server, _guard) = create_populated_test_server();

    let response = server.get("/top?k=1000000").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let top: TopResponse = response.json();
    assert!(!top.success);
    assert!(top.error.is_some());
}

#[tokio::test]
async fn test_top_uses_configured_default_k() {
    let guard = lock();
    let state = AppState::new(Catalog::from_seed(shop_seed())).with_default_k(1);
    let server = TestServer::new(create_router(state)).unwrap();

    let top: TopResponse = server.get("/top").await.json();
    assert_eq!(top.k, 1);
    assert_eq!(top.items.len(), 1);
    drop(guard);
}

#[tokio::test]
async fn test_repeated_top_hits_cache() {
    let (server, _guard) = create_populated_test_server();

    server.get("/top?k=2").await.assert_status_ok();
    server.get("/top?k=2").await.assert_status_ok();

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.cache_entries, 1);
    assert_eq!(status.cache_misses, 1);
    assert_eq!(status.cache_hits, 1);
}

#[tokio::test]
async fn test_cache_clear_empties_cache() {
    let (server, _guard) = create_populated_test_server();

    server.get("/top?k=1").await.assert_status_ok();
    server.get("/top?k=2").await.assert_status_ok();

    let response = server.post("/cache/clear").await;
    response.assert_status_ok();
    let cleared: CacheClearResponse = response.json();
    assert!(cleared.success);
    assert_eq!(cleared.cleared, 2);

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.cache_entries, 0);

    // Results are recomputed and still correct.
    let top: TopResponse = server.get("/top?k=1").await.json();
    assert_eq!(ids(&top.items), vec!["bolid_2"]);
}

// =============================================================================
// GARAGE
// =============================================================================

#[tokio::test]
async fn test_quote_applies_discount() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/garage/quote")
        .json(&garage("coll_1", &[("bolid_1", 2)]))
        .await;

    response.assert_status_ok();
    let quote: QuoteResponse = response.json();
    assert!(quote.success);
    assert_eq!(quote.total, Some(9_400_000));
    assert_eq!(quote.discounted_total, Some(8_460_000));
    assert!(quote.in_stock);
}

#[tokio::test]
async fn test_quote_reports_missing_stock() {
    let (server, _guard) = create_populated_test_server();

    let quote: QuoteResponse = server
        .post("/garage/quote")
        .json(&garage("coll_1", &[("bolid_3", 2)]))
        .await
        .json();
    assert!(quote.success);
    assert_eq!(quote.total, Some(12_000_000));
    assert!(!quote.in_stock);
}

#[tokio::test]
async fn test_checkout_places_order() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/garage/checkout")
        .json(&garage("coll_1", &[("bolid_3", 1), ("bolid_1", 1), ("bolid_3", 1)]))
        .await;

    response.assert_status_ok();
    let result: CheckoutResponse = response.json();
    assert!(result.success);
    let order = result.order.unwrap();
    assert_eq!(order.id.as_str(), "order_3");
    assert_eq!(order.owner_id.as_str(), "coll_1");
    assert_eq!(order.total_price, 16_700_000);
    assert_eq!(order.line_items.len(), 2);
    assert_eq!(order.line_items[0].quantity, 2);

    let top: TopResponse = server.get("/top?k=1").await.json();
    assert_eq!(ids(&top.items), vec!["bolid_2"]);
    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.order_count, 3);
}

#[tokio::test]
async fn test_checkout_refreshes_rankings() {
    let (server, _guard) = create_populated_test_server();

    let before: TopResponse = server.get("/top?k=3").await.json();
    assert_eq!(ids(&before.items), vec!["bolid_2", "bolid_1"]);

    server
        .post("/garage/checkout")
        .json(&garage("coll_1", &[("bolid_3", 5)]))
        .await
        .assert_status_ok();

    let after: TopResponse = server.get("/top?k=3").await.json();
    assert_eq!(ids(&after.items), vec!["bolid_3", "bolid_2", "bolid_1"]);
}

#[tokio::test]
async fn test_checkout_unknown_collector_returns_404() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/garage/checkout")
        .json(&garage("coll_404", &[("bolid_1", 1)]))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let result: CheckoutResponse = response.json();
    assert!(!result.success);
    assert!(result.order.is_none());
}

#[tokio::test]
async fn test_checkout_unknown_item_returns_404() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/garage/checkout")
        .json(&garage("coll_1", &[("bolid_404", 1)]))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_zero_quantity_returns_400() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/garage/checkout")
        .json(&garage("coll_1", &[("bolid_1", 0)]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_empty_garage_returns_400() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/garage/checkout")
        .json(&garage("coll_1", &[]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.order_count, 2);
}

#[tokio::test]
async fn test_checkout_persists_to_seed_file() {
    let guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.json");
    let state = AppState::new(Catalog::from_seed(shop_seed())).with_data_path(&path);
    let server = TestServer::new(create_router(state)).unwrap();

    server
        .post("/garage/checkout")
        .json(&garage("coll_2", &[("bolid_1", 1)]))
        .await
        .assert_status_ok();

    let written = paddock::store::read_seed(&path).unwrap();
    assert_eq!(written.orders.len(), 3);
    assert_eq!(written.orders[2].owner_id.as_str(), "coll_2");
    assert_eq!(written.items, shop_seed().items);
    drop(guard);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_checkouts_all_persisted() {
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    let guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.json");
    let state = AppState::new(Catalog::from_seed(shop_seed())).with_data_path(&path);
    let router = create_router(state.clone());

    let mut tasks = Vec::new();
    for i in 0..48u32 {
        let router = router.clone();
        let collector = if i % 2 == 0 { "coll_1" } else { "coll_2" };
        let body = serde_json::to_vec(&garage(collector, &[("bolid_2", i % 3 + 1)])).unwrap();
        tasks.push(tokio::spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri("/garage/checkout")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let in_memory = state.catalog.read().await.to_seed();
    let persisted = paddock::store::read_seed(&path).unwrap();
    assert_eq!(in_memory.orders.len(), 50);
    assert_eq!(persisted, in_memory);
    drop(guard);
}

// =============================================================================
// MAINTENANCE
// =============================================================================

#[tokio::test]
async fn test_validate_clean_catalog() {
    let (server, _guard) = create_populated_test_server();

    let report: ValidateResponse = server.get("/validate").await.json();
    assert!(report.valid);
    assert!(report.issues.is_empty());
}

#[tokio::test]
async fn test_validate_reports_dangling_era() {
    let guard = lock();
    let mut seed = shop_seed();
    seed.items
        .push(Item::new("bolid_9", "Ghost", "Nobody", 1, "era_turbo"));
    let server =
        TestServer::new(create_router(AppState::new(Catalog::from_seed(seed)))).unwrap();

    let report: ValidateResponse = server.get("/validate").await.json();
    assert!(!report.valid);
    assert_eq!(report.issues.len(), 1);
    drop(guard);
}

#[tokio::test]
async fn test_export_is_decodable_snapshot() {
    let (server, _guard) = create_populated_test_server();

    let response = server.post("/export").await;

    response.assert_status_ok();
    let export: ExportResponse = response.json();
    assert!(export.success);
    let data = base64::Engine::decode(
        &base64::engine::general_purpose::STANDARD,
        export.data.unwrap(),
    )
    .unwrap();
    assert_eq!(&data[..4], b"PDCK");
    assert_eq!(snapshot_from_bytes(&data).unwrap(), shop_seed());
    assert_eq!(export.checksum.unwrap().len(), 64);
}

#[tokio::test]
async fn test_hash_changes_with_content() {
    let guard = lock();
    let empty = TestServer::new(create_router(AppState::new(Catalog::from_seed(base_seed()))))
        .unwrap();
    let populated =
        TestServer::new(create_router(AppState::new(Catalog::from_seed(shop_seed())))).unwrap();

    let a: HashResponse = empty.get("/hash").await.json();
    let b: HashResponse = populated.get("/hash").await.json();

    assert_eq!(a.algorithm, "blake3");
    assert_eq!(a.hash.len(), 64);
    assert!(a.hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a.hash, b.hash);

    let again: HashResponse = populated.get("/hash").await.json();
    assert_eq!(b.hash, again.hash);
    drop(guard);
}

// =============================================================================
// ERROR HANDLING TESTS
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/unknown").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (server, _guard) = create_test_server();

    // /health is GET only
    let response = server.post("/health").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/garage/checkout")
        .bytes(bytes::Bytes::from("not valid json"))
        .content_type("application/json")
        .await;

    assert!(response.status_code().is_client_error());
}

// =============================================================================
// AUTHENTICATION MIDDLEWARE TESTS
// =============================================================================

/// Create a test server with authentication enabled.
/// Must be called while holding AUTH_TEST_MUTEX.
fn create_auth_test_server(api_key: &str) -> TestServer {
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::set_var("PADDOCK_API_KEY", api_key) };
    let state = AppState::new(Catalog::from_seed(shop_seed()));
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let _guard = lock();
    let api_key = "test-secret-key-12345";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/status")
        .add_header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse::<HeaderValue>()
                .unwrap(),
        )
        .await;

    response.assert_status_ok();
    let status: StatusResponse = response.json();
    assert_eq!(status.item_count, 3);
}

#[tokio::test]
async fn test_auth_valid_raw_token() {
    let _guard = lock();
    let api_key = "test-raw-key-67890";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/top")
        .add_header(
            axum::http::header::AUTHORIZATION,
            api_key.parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let _guard = lock();
    let server = create_auth_test_server("correct-key");

    let response = server
        .post("/garage/checkout")
        .json(&garage("coll_1", &[("bolid_1", 1)]))
        .add_header(
            axum::http::header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    assert_eq!(
        response.status_code().as_u16(),
        401,
        "Invalid token should return 401 Unauthorized"
    );
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let _guard = lock();
    let server = create_auth_test_server("required-key");

    let response = server.get("/status").await;

    assert_eq!(response.status_code().as_u16(), 401);
}

#[tokio::test]
async fn test_auth_health_endpoint_bypasses_auth() {
    let _guard = lock();
    let server = create_auth_test_server("secret-key-for-bypass-test");

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
}
