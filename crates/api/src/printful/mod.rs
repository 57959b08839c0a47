//! Printful REST adapter.
//!
//! Requests authenticate with `Authorization: Bearer <key>` taken from the
//! request's credential set. Successful responses wrap their payload in a
//! `{"code": 200, "result": ...}` envelope; errors carry
//! `{"error": {"message": ...}}`.

mod mockup;

pub use mockup::{DEFAULT_PRODUCT_ID, DEFAULT_VARIANT_ID, MockupRender, MockupRequest, TaskState};

use std::sync::Arc;

use pod_relay_core::CredentialSet;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use crate::config::PrintfulConfig;
use crate::error::{Provider, RelayError, body_excerpt};
use crate::poll::PollPolicy;

/// Printful API client.
#[derive(Clone)]
pub struct PrintfulClient {
    inner: Arc<PrintfulClientInner>,
}

struct PrintfulClientInner {
    client: reqwest::Client,
    base_url: String,
    poll: PollPolicy,
}

/// Success envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

/// Error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
    result: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl PrintfulClient {
    /// Create a new client sharing `client`'s connection pool.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &PrintfulConfig) -> Self {
        Self {
            inner: Arc::new(PrintfulClientInner {
                client,
                base_url: config.base_url.clone(),
                poll: config.poll,
            }),
        }
    }

    /// Configured mockup polling policy.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        self.inner.poll
    }

    /// Call `{base}{path}` and return the envelope's `result`.
    ///
    /// # Errors
    ///
    /// - `RelayError::Config` if the API key is absent
    /// - `RelayError::Provider` with `error.message` (or the status text) on
    ///   a non-2xx response, or if the body does not parse
    /// - `RelayError::Transport` if the API cannot be reached
    #[instrument(skip(self, credentials, body))]
    pub async fn call<T: DeserializeOwned>(
        &self,
        credentials: &CredentialSet,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, RelayError> {
        let api_key = credentials
            .fulfillment_key
            .as_ref()
            .ok_or(RelayError::Config(Provider::Printful))?;

        let url = format!("{}{path}", self.inner.base_url);
        let mut request = self
            .inner
            .client
            .request(method, &url)
            .bearer_auth(api_key.expose_secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RelayError::transport(Provider::Printful, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RelayError::transport(Provider::Printful, e))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body_excerpt(&text), "Printful API error");
            return Err(parse_error(status, &text));
        }

        serde_json::from_str::<Envelope<T>>(&text)
            .map(|envelope| envelope.result)
            .map_err(|e| {
                RelayError::provider(
                    Provider::Printful,
                    Some(status.as_u16()),
                    format!("invalid response: {e}"),
                )
            })
    }
}

/// Build a provider error from a non-success response body.
fn parse_error(status: StatusCode, body: &str) -> RelayError {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|b| b.error.as_ref())
        .and_then(|e| e.message.clone())
        .or_else(|| {
            parsed
                .as_ref()
                .and_then(|b| b.result.as_ref())
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.as_u16().to_string());

    RelayError::provider(Provider::Printful, Some(status.as_u16()), message)
}
