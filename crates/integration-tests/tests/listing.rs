//! Listing routes against a mock store.

use pod_relay_integration_tests::{TestRelay, post};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_create_listing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2025-01/products.json"))
        .and(header("X-Shopify-Access-Token", "shpat_test_token"))
        .and(body_partial_json(json!({"product": {
            "title": "Debug Mode Tee",
            "vendor": "DevMode",
            "product_type": "Apparel",
            "status": "draft",
            "tags": "dev, tee"
        }})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "product": {"id": 8_123_456_789_u64, "handle": "debug-mode-tee", "status": "draft"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = TestRelay::new().with_shopify(&server).build();

    let response = post(
        &app,
        "/api/listing",
        &json!({"title": "Debug Mode Tee", "tags": ["dev", "tee"]}),
        &[],
    )
    .await;

    assert!(response.ok());
    assert_eq!(response.body["listingId"], 8_123_456_789_u64);
    assert_eq!(
        response.body["adminUrl"],
        format!("{}/admin/products/8123456789", server.uri())
    );
    assert_eq!(response.body["product"]["handle"], "debug-mode-tee");
}

#[tokio::test]
async fn test_create_listing_validation_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2025-01/products.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": {"title": ["can't be blank"]}
        })))
        .mount(&server)
        .await;
    let app = TestRelay::new().with_shopify(&server).build();

    let response = post(&app, "/api/listing", &json!({"title": "   x"}), &[]).await;

    assert_eq!(response.status, 200);
    assert!(!response.ok());
    assert!(response.error().contains("422"));
    assert!(response.error().contains("title: can't be blank"));
    assert!(response.body.get("listingId").is_none());
}

#[tokio::test]
async fn test_create_listing_placeholder_without_credentials() {
    let app = TestRelay::new().build();

    let response = post(&app, "/api/listing", &json!({"title": "Debug Mode Tee"}), &[]).await;

    assert!(response.ok());
    assert!(
        response.body["listingId"]
            .as_str()
            .is_some_and(|id| id.starts_with("MOCK-"))
    );
    assert!(response.body["message"].as_str().is_some());
}

#[tokio::test]
async fn test_create_listing_requires_title() {
    let app = TestRelay::new().build();

    let response = post(&app, "/api/listing", &json!({"price": "19.99"}), &[]).await;

    assert_eq!(response.status, 400);
    assert_eq!(response.error(), "title is required");
}

#[tokio::test]
async fn test_publish_listing() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/api/2025-01/products/8123456789.json"))
        .and(body_json(json!({"product": {"id": 8_123_456_789_u64, "status": "active"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": {"id": 8_123_456_789_u64, "handle": "debug-mode-tee", "status": "active"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = TestRelay::new().with_shopify(&server).build();

    let response = post(&app, "/api/publish", &json!({"listingId": 8_123_456_789_u64}), &[]).await;

    assert!(response.ok());
    assert_eq!(
        response.body["url"],
        format!("{}/products/debug-mode-tee", server.uri())
    );
    assert_eq!(response.body["product"]["status"], "active");
}

#[tokio::test]
async fn test_publish_requires_listing_id() {
    let app = TestRelay::new().build();

    let response = post(&app, "/api/publish", &json!({}), &[]).await;

    assert_eq!(response.status, 400);
    assert_eq!(response.error(), "listingId is required");
}

#[tokio::test]
async fn test_publish_placeholder_without_credentials() {
    let app = TestRelay::new().build();

    let response = post(&app, "/api/publish", &json!({"listingId": "42"}), &[]).await;

    assert!(response.ok());
    assert_eq!(
        response.body["url"],
        "https://example.myshopify.com/products/demo-product-42"
    );
}
