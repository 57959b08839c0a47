//! Integration tests for the POD relay.
//!
//! Each test builds the full router with [`pod_relay_api::app`] and drives it
//! in-process with `tower::ServiceExt::oneshot`. Upstreams are `wiremock`
//! servers; point a provider at one with the [`TestRelay`] builder.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pod-relay-integration-tests
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use pod_relay_api::config::RelayConfig;
use pod_relay_api::poll::PollPolicy;
use pod_relay_api::state::AppState;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

/// Builder for a relay wired to mock upstreams.
pub struct TestRelay {
    config: RelayConfig,
}

impl Default for TestRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRelay {
    /// A relay with no credentials and near-instant polling.
    #[must_use]
    pub fn new() -> Self {
        let mut config = RelayConfig::default();
        config.printful.poll = PollPolicy::new(Duration::from_millis(1), 10);
        Self { config }
    }

    /// Configure the store credentials against `server`.
    #[must_use]
    pub fn with_shopify(mut self, server: &MockServer) -> Self {
        self.config.credentials.commerce_domain = Some(server.uri());
        self.config.credentials.commerce_token = Some(SecretString::from("shpat_test_token"));
        self
    }

    /// Configure the fulfillment key against `server`.
    #[must_use]
    pub fn with_printful(mut self, server: &MockServer) -> Self {
        self.config.printful.base_url = server.uri();
        self.config.credentials.fulfillment_key = Some(SecretString::from("pf_test_key"));
        self
    }

    /// Point the AI adapter at `server` without configuring a key.
    #[must_use]
    pub fn with_openai_base(mut self, server: &MockServer) -> Self {
        self.config.openai.base_url = server.uri();
        self
    }

    /// Configure the AI key against `server`.
    #[must_use]
    pub fn with_openai(self, server: &MockServer) -> Self {
        let mut relay = self.with_openai_base(server);
        relay.config.credentials.ai_key = Some(SecretString::from("sk-test-key"));
        relay
    }

    /// Scan `root` for the status check routes.
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.project_root = root.into();
        self
    }

    /// Build the router.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn build(self) -> Router {
        let state = AppState::new(self.config).expect("Failed to build application state");
        pod_relay_api::app(state)
    }
}

/// A decoded relay response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `ok` flag of the envelope.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.body["ok"].as_bool().unwrap_or(false)
    }

    /// The `error` text of a failed envelope.
    #[must_use]
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// `GET path`.
///
/// # Panics
///
/// Panics if the request cannot be built or the body is not JSON.
pub async fn get(app: &Router, path: &str, headers: &[(&str, &str)]) -> TestResponse {
    send(app, Method::GET, path, None, headers).await
}

/// `POST path` with a JSON body.
///
/// # Panics
///
/// Panics if the request cannot be built or the body is not JSON.
pub async fn post(app: &Router, path: &str, body: &Value, headers: &[(&str, &str)]) -> TestResponse {
    send(app, Method::POST, path, Some(body.to_string()), headers).await
}

/// `POST path` with a raw body.
///
/// # Panics
///
/// Panics if the request cannot be built or the body is not JSON.
pub async fn post_raw(app: &Router, path: &str, body: &str) -> TestResponse {
    send(app, Method::POST, path, Some(body.to_string()), &[]).await
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<String>,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(path);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let request = builder
        .body(body.map_or_else(Body::empty, Body::from))
        .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).expect("Response body is not JSON");

    TestResponse {
        status,
        headers,
        body,
    }
}

/// A scratch directory removed on drop.
pub struct TempProject {
    pub root: PathBuf,
}

impl TempProject {
    /// Create an empty directory under the system temp dir.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("pod-relay-it-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("Failed to create temp project");
        Self { root }
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(path, contents).expect("Failed to write file");
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempProject {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
