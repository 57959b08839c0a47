//! Shopify Admin API adapter.
//!
//! # Architecture
//!
//! - One shared `reqwest::Client`; the store domain and access token come
//!   from the request's [`CredentialSet`] on every call
//! - GraphQL bodies use `graphql_client`'s `QueryBody`/`Response` envelopes
//!   with hand-written operation documents in [`queries`]
//! - REST calls are passed through as JSON
//! - No retries: rate limits and auth failures surface as provider errors
//!
//! # Example
//!
//! ```rust,ignore
//! use pod_relay_api::shopify::{ShopifyClient, UploadAsset};
//!
//! let client = ShopifyClient::new(http, &config.shopify);
//!
//! // Staged upload of a data URL
//! let asset = UploadAsset::from_data_url(data_url, "design.png")?;
//! let outcome = client.upload(&credentials, asset).await?;
//!
//! // Create a draft listing
//! let created = client.create_listing(&credentials, &draft).await?;
//! ```

mod products;
pub mod queries;
mod upload;

pub use products::{
    CreatedListing, ListingDraft, ListingVariant, PublishedListing, default_price, storefront_url,
};
pub use upload::{FileReference, StagedUploadTicket, UploadAsset, UploadOutcome};

use std::sync::Arc;

use graphql_client::{QueryBody, Response as GraphQLResponse};
use pod_relay_core::CredentialSet;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::instrument;

use crate::config::ShopifyConfig;
use crate::error::{Provider, RelayError, body_excerpt};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Shopify Admin API client.
///
/// Cheap to clone. Holds no credentials of its own.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    api_version: String,
    listing_vendor: String,
    listing_product_type: String,
}

/// Store access resolved from a credential set.
struct StoreAccess<'a> {
    admin_base: String,
    token: &'a SecretString,
}

/// A mutation user error (`field` path + message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserError {
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl ShopifyClient {
    /// Create a new Admin API client sharing `client`'s connection pool.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ShopifyConfig) -> Self {
        Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                api_version: config.api_version.clone(),
                listing_vendor: config.listing_vendor.clone(),
                listing_product_type: config.listing_product_type.clone(),
            }),
        }
    }

    /// Get the API version.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.inner.api_version
    }

    fn store<'a>(&self, credentials: &'a CredentialSet) -> Result<StoreAccess<'a>, RelayError> {
        match (&credentials.commerce_domain, &credentials.commerce_token) {
            (Some(domain), Some(token)) => Ok(StoreAccess {
                admin_base: format!(
                    "{}/admin/api/{}",
                    commerce_base(domain),
                    self.inner.api_version
                ),
                token,
            }),
            _ => Err(RelayError::Config(Provider::Shopify)),
        }
    }

    /// Execute a GraphQL operation and return its `data`.
    ///
    /// # Errors
    ///
    /// - `RelayError::Config` if the store domain or token is absent
    /// - `RelayError::Provider` on 401/429/non-success status, a non-empty
    ///   `errors` list, or a missing `data` field
    /// - `RelayError::Transport` if the store cannot be reached
    #[instrument(skip(self, credentials, query, variables))]
    pub async fn graphql<V, D>(
        &self,
        credentials: &CredentialSet,
        operation_name: &'static str,
        query: &'static str,
        variables: V,
    ) -> Result<D, RelayError>
    where
        V: Serialize + Send,
        D: DeserializeOwned,
    {
        let store = self.store(credentials)?;
        let endpoint = format!("{}/graphql.json", store.admin_base);

        let body = QueryBody {
            variables,
            query,
            operation_name,
        };

        let response = self
            .inner
            .client
            .post(&endpoint)
            .header(ACCESS_TOKEN_HEADER, store.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::transport(Provider::Shopify, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_status(status, response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| RelayError::transport(Provider::Shopify, e))?;
        let graphql_response: GraphQLResponse<D> = serde_json::from_str(&text).map_err(|e| {
            RelayError::provider(
                Provider::Shopify,
                Some(status.as_u16()),
                format!("invalid GraphQL response: {e}"),
            )
        })?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            tracing::warn!(count = errors.len(), "Shopify GraphQL errors");
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RelayError::Provider {
                provider: Provider::Shopify,
                status: None,
                message,
                details: serde_json::to_value(&errors).ok(),
            });
        }

        graphql_response.data.ok_or_else(|| {
            RelayError::provider(Provider::Shopify, None, "No data in response")
        })
    }

    /// Call a REST endpoint under `/admin/api/{version}`.
    ///
    /// `path` starts with `/` (e.g. `/products.json`).
    ///
    /// # Errors
    ///
    /// - `RelayError::Config` if the store domain or token is absent
    /// - `RelayError::Provider` with the HTTP status and upstream `errors`
    ///   payload on a non-2xx response
    /// - `RelayError::Transport` if the store cannot be reached
    #[instrument(skip(self, credentials, body))]
    pub async fn rest(
        &self,
        credentials: &CredentialSet,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, RelayError> {
        let store = self.store(credentials)?;
        let url = format!("{}{path}", store.admin_base);

        let mut request = self
            .inner
            .client
            .request(method, &url)
            .header(ACCESS_TOKEN_HEADER, store.token.expose_secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RelayError::transport(Provider::Shopify, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_status(status, response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| RelayError::transport(Provider::Shopify, e))?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            RelayError::provider(
                Provider::Shopify,
                Some(status.as_u16()),
                format!("invalid JSON response: {e}"),
            )
        })
    }
}

/// Base URL for a store domain.
///
/// Bare domains get `https://`; a domain that already carries an `http(s)://`
/// scheme is used as is.
#[must_use]
pub fn commerce_base(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("https://") || domain.starts_with("http://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

/// Map a non-success response to a provider error.
async fn error_from_status(status: StatusCode, response: reqwest::Response) -> RelayError {
    // Check for rate limiting
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after: u64 = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(60);
        return RelayError::provider(
            Provider::Shopify,
            Some(status.as_u16()),
            format!("rate limited, retry after {retry_after} seconds"),
        );
    }

    // Check for unauthorized
    if status == StatusCode::UNAUTHORIZED {
        return RelayError::provider(
            Provider::Shopify,
            Some(status.as_u16()),
            "Invalid or expired access token",
        );
    }

    let text = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %body_excerpt(&text), "Shopify REST error");

    let errors = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|mut v| v.get_mut("errors").map(serde_json::Value::take));

    match errors {
        Some(errors) => RelayError::Provider {
            provider: Provider::Shopify,
            status: Some(status.as_u16()),
            message: describe_errors(&errors),
            details: Some(errors),
        },
        None => RelayError::provider(
            Provider::Shopify,
            Some(status.as_u16()),
            if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body_excerpt(&text)
            },
        ),
    }
}

/// Flatten a REST `errors` payload (string, list, or field map) into one line.
fn describe_errors(errors: &serde_json::Value) -> String {
    use serde_json::Value;

    fn join(items: &[Value]) -> String {
        items
            .iter()
            .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
            .collect::<Vec<_>>()
            .join(", ")
    }

    match errors {
        Value::String(s) => s.clone(),
        Value::Array(items) => join(items),
        Value::Object(map) => map
            .iter()
            .map(|(field, value)| match value {
                Value::Array(items) => format!("{field}: {}", join(items)),
                Value::String(s) => format!("{field}: {s}"),
                other => format!("{field}: {other}"),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// Convert mutation user errors into a provider error, if any.
pub(crate) fn check_user_errors(user_errors: &[UserError]) -> Result<(), RelayError> {
    if user_errors.is_empty() {
        return Ok(());
    }

    let error_messages: Vec<String> = user_errors
        .iter()
        .map(|e| {
            let field = e.field.as_ref().map_or_else(String::new, |f| f.join("."));
            format!("{}: {}", field, e.message)
        })
        .collect();

    Err(RelayError::Provider {
        provider: Provider::Shopify,
        status: None,
        message: error_messages.join("; "),
        details: serde_json::to_value(user_errors).ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::RelayConfig;

    fn client() -> ShopifyClient {
        ShopifyClient::new(reqwest::Client::new(), &RelayConfig::default().shopify)
    }

    fn credentials(server: &MockServer) -> CredentialSet {
        CredentialSet {
            commerce_domain: Some(server.uri()),
            commerce_token: Some(SecretString::from("shpat_test")),
            ..CredentialSet::default()
        }
    }

    #[test]
    fn test_commerce_base() {
        assert_eq!(
            commerce_base("dev-mode.myshopify.com"),
            "https://dev-mode.myshopify.com"
        );
        assert_eq!(commerce_base("http://127.0.0.1:4010/"), "http://127.0.0.1:4010");
    }

    #[test]
    fn test_describe_errors() {
        assert_eq!(describe_errors(&json!("Not Found")), "Not Found");
        assert_eq!(
            describe_errors(&json!({"price": ["is invalid", "must be positive"]})),
            "price: is invalid, must be positive"
        );
    }

    #[test]
    fn test_check_user_errors() {
        assert!(check_user_errors(&[]).is_ok());

        let err = check_user_errors(&[UserError {
            field: Some(vec!["files".to_string(), "0".to_string(), "originalSource".to_string()]),
            message: "Invalid URL".to_string(),
        }])
        .expect_err("user errors");

        assert_eq!(err.to_string(), "Shopify API error: files.0.originalSource: Invalid URL");
    }

    #[tokio::test]
    async fn test_graphql_missing_credentials() {
        let result: Result<serde_json::Value, _> = client()
            .graphql(&CredentialSet::default(), "shop", "{ shop { name } }", json!({}))
            .await;

        assert!(matches!(result, Err(RelayError::Config(Provider::Shopify))));
    }

    #[tokio::test]
    async fn test_graphql_returns_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/api/2025-01/graphql.json"))
            .and(header("X-Shopify-Access-Token", "shpat_test"))
            .and(body_partial_json(json!({"operationName": "shop"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"shop": {"name": "DevMode"}}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let data: serde_json::Value = client()
            .graphql(&credentials(&server), "shop", "query shop { shop { name } }", json!({}))
            .await
            .expect("graphql call");

        assert_eq!(data["shop"]["name"], "DevMode");
    }

    #[tokio::test]
    async fn test_graphql_errors_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [
                    {"message": "Field 'nope' doesn't exist on type 'Shop'"},
                    {"message": "Access denied"}
                ]
            })))
            .mount(&server)
            .await;

        let err = client()
            .graphql::<_, serde_json::Value>(&credentials(&server), "shop", "{ shop { nope } }", json!({}))
            .await
            .expect_err("graphql errors");

        match err {
            RelayError::Provider {
                provider, message, details, ..
            } => {
                assert_eq!(provider, Provider::Shopify);
                assert_eq!(message, "Field 'nope' doesn't exist on type 'Shop'; Access denied");
                assert!(details.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_graphql_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
            .mount(&server)
            .await;

        let err = client()
            .graphql::<_, serde_json::Value>(&credentials(&server), "shop", "{ shop { name } }", json!({}))
            .await
            .expect_err("rate limited");

        assert_eq!(
            err.to_string(),
            "Shopify API error (429): rate limited, retry after 2 seconds"
        );
    }

    #[tokio::test]
    async fn test_rest_unprocessable_entity_carries_user_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/api/2025-01/products.json"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"errors": {"title": ["can't be blank"]}})),
            )
            .mount(&server)
            .await;

        let err = client()
            .rest(
                &credentials(&server),
                Method::POST,
                "/products.json",
                Some(&json!({"product": {}})),
            )
            .await
            .expect_err("422");

        match err {
            RelayError::Provider {
                status, message, details, ..
            } => {
                assert_eq!(status, Some(422));
                assert_eq!(message, "title: can't be blank");
                assert_eq!(details, Some(json!({"title": ["can't be blank"]})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rest_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("[API] Invalid API key"))
            .mount(&server)
            .await;

        let err = client()
            .rest(&credentials(&server), Method::GET, "/shop.json", None)
            .await
            .expect_err("401");

        assert_eq!(
            err.to_string(),
            "Shopify API error (401): Invalid or expired access token"
        );
    }
}
