//! Integration tests for product search through the products page.
//!
//! Run with: cargo test -p bazaar-integration-tests --test catalog_search

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use bazaar_integration_tests::{FakeBackend, catalog, fresh_token};
use bazaar_storefront::api::ApiClient;
use bazaar_storefront::notification::{Severity, Snackbar};
use bazaar_storefront::page::ProductsPage;
use bazaar_storefront::session::MemoryTokenStore;

async fn open_page() -> (FakeBackend, ProductsPage<ApiClient>) {
    let backend = FakeBackend::start(catalog()).await;
    let (client, _) = backend.client(Arc::new(MemoryTokenStore::with_token(fresh_token())));
    let mut page = ProductsPage::new(client, Snackbar::new());
    page.load().await.expect("Initial load should succeed");
    backend.reset_requests();
    (backend, page)
}

fn names(page: &ProductsPage<ApiClient>) -> Vec<&str> {
    page.products().iter().map(|p| p.name.as_str()).collect()
}

#[tokio::test]
async fn test_search_replaces_list_and_clear_restores_it() {
    let (backend, mut page) = open_page().await;
    assert_eq!(page.products().len(), 4);

    page.set_search_query("phone");
    page.search().await.expect("Search should succeed");

    assert_eq!(names(&page), vec!["Phone X", "Budget Phone"]);
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].route(), "GET /products/search");
    assert_eq!(requests[0].query.as_deref(), Some("query=phone"));

    page.clear_search().await.expect("Clear should succeed");

    assert_eq!(page.search_query(), "");
    assert_eq!(page.products().len(), 4);
    assert_eq!(
        backend.routes(),
        vec!["GET /products/search", "GET /products"]
    );
}

#[tokio::test]
async fn test_search_query_is_trimmed_and_encoded() {
    let (backend, mut page) = open_page().await;

    page.set_search_query("  budget phone ");
    page.search().await.expect("Search should succeed");

    assert_eq!(names(&page), vec!["Budget Phone"]);
    assert_eq!(
        backend.requests()[0].query.as_deref(),
        Some("query=budget+phone")
    );
}

#[tokio::test]
async fn test_search_query_with_percent_sign_round_trips() {
    let (backend, mut page) = open_page().await;

    page.set_search_query("charger");
    page.search().await.expect("Search should succeed");
    assert_eq!(names(&page), vec!["USB Charger"]);

    page.set_search_query("charger 100%");
    page.search().await.expect("Search should succeed");
    assert!(page.products().is_empty());
    assert_eq!(
        backend.requests()[1].query.as_deref(),
        Some("query=charger+100%25")
    );
}

#[tokio::test]
async fn test_search_without_matches_empties_grid() {
    let (_backend, mut page) = open_page().await;

    page.set_search_query("tablet");
    page.search().await.expect("Search should succeed");

    assert!(page.products().is_empty());
}

#[tokio::test]
async fn test_search_failure_keeps_grid_and_shows_error() {
    let (backend, mut page) = open_page().await;
    backend.fail(
        Method::GET,
        "/products/search",
        StatusCode::SERVICE_UNAVAILABLE,
        "Search index rebuilding",
    );

    page.set_search_query("phone");
    page.search().await.expect_err("Search should fail");

    assert_eq!(page.products().len(), 4);
    let notification = page.notification().expect("Error should be shown");
    assert_eq!(notification.severity, Severity::Error);
    assert_eq!(notification.message, "Search index rebuilding");
}
