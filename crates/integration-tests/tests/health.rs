//! Service info, config and channel routes.

use pod_relay_integration_tests::{TestRelay, get, post_raw};
use wiremock::MockServer;

#[tokio::test]
async fn test_health_reports_configured_defaults() {
    let server = MockServer::start().await;
    let app = TestRelay::new().with_printful(&server).build();

    let response = get(&app, "/health", &[]).await;

    assert_eq!(response.status, 200);
    assert!(response.ok());
    assert_eq!(response.body["service"], "pod-creator-api");
    assert_eq!(response.body["environment"]["hasShopify"], false);
    assert_eq!(response.body["environment"]["hasPrintful"], true);
    assert_eq!(response.body["environment"]["hasOpenAI"], false);
    assert!(response.body["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
}

#[tokio::test]
async fn test_health_ignores_override_headers() {
    let app = TestRelay::new().build();

    let response = get(&app, "/health", &[("x-openai-key", "sk-from-header")]).await;

    assert_eq!(response.body["environment"]["hasOpenAI"], false);
}

#[tokio::test]
async fn test_config_uses_override_headers() {
    let app = TestRelay::new().build();

    let plain = get(&app, "/api/config", &[]).await;
    assert!(plain.ok());
    assert_eq!(plain.body["styleA"]["canvas"], "4500x5400");
    assert_eq!(plain.body["thresholds"]["bgTolerance"], 12);
    assert_eq!(plain.body["integrations"]["ai"], false);

    let overridden = get(
        &app,
        "/api/config",
        &[
            ("x-openai-key", "sk-from-header"),
            ("x-shopify-store", "dev-mode.myshopify.com"),
            ("x-shopify-token", "shpat_from_header"),
        ],
    )
    .await;
    assert_eq!(overridden.body["integrations"]["ai"], true);
    assert_eq!(overridden.body["integrations"]["shopify"], true);
    assert_eq!(overridden.body["integrations"]["printful"], false);
}

#[tokio::test]
async fn test_channels() {
    let app = TestRelay::new().build();

    let response = get(&app, "/api/channels", &[("x-printful-key", "pf_header_key")]).await;

    assert!(response.ok());
    let channels = response.body["channels"].as_array().expect("channels array");
    assert_eq!(channels.len(), 3);
    assert_eq!(channels[0]["id"], "shopify");
    assert_eq!(channels[0]["enabled"], false);
    assert_eq!(channels[1]["id"], "etsy");
    assert_eq!(channels[1]["enabled"], false);
    assert_eq!(channels[2]["id"], "printful");
    assert_eq!(channels[2]["enabled"], true);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestRelay::new().build();

    let echoed = get(&app, "/health", &[("x-request-id", "req-123")]).await;
    assert_eq!(
        echoed.headers.get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("req-123")
    );

    let generated = get(&app, "/health", &[]).await;
    assert!(generated.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestRelay::new().build();

    let response = post_raw(&app, "/api/trends", "{not json").await;

    assert_eq!(response.status, 400);
    assert!(!response.ok());
    assert!(response.error().starts_with("Invalid JSON body"));
}
