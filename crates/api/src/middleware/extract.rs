//! Request extractors.
//!
//! - [`Credentials`] resolves the per-request credential set from the
//!   override headers over the configured defaults.
//! - [`JsonPayload`] parses a JSON body leniently: the content type is not
//!   checked and an empty body reads as `{}`. Parse failures are a
//!   `RelayError::BadRequest`, so they render as `{ok:false,error}` with 400.

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{HeaderMap, request::Parts},
};
use pod_relay_core::CredentialSet;
use secrecy::SecretString;
use serde::de::DeserializeOwned;

use crate::error::RelayError;
use crate::state::AppState;

pub const SHOPIFY_STORE_HEADER: &str = "x-shopify-store";
pub const SHOPIFY_TOKEN_HEADER: &str = "x-shopify-token";
pub const PRINTFUL_KEY_HEADER: &str = "x-printful-key";
pub const OPENAI_KEY_HEADER: &str = "x-openai-key";

/// Credentials for this request: header overrides resolved over the
/// configured defaults.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Credentials(creds): Credentials) -> impl IntoResponse {
///     creds.has_commerce().to_string()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Credentials(pub CredentialSet);

impl Credentials {
    /// Read the override headers into a partial credential set.
    #[must_use]
    pub fn overrides(headers: &HeaderMap) -> CredentialSet {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        CredentialSet {
            commerce_domain: text(SHOPIFY_STORE_HEADER),
            commerce_token: text(SHOPIFY_TOKEN_HEADER).map(SecretString::from),
            fulfillment_key: text(PRINTFUL_KEY_HEADER).map(SecretString::from),
            ai_key: text(OPENAI_KEY_HEADER).map(SecretString::from),
        }
    }
}

impl FromRequestParts<AppState> for Credentials {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let overrides = Self::overrides(&parts.headers);
        Ok(Self(CredentialSet::resolve(
            &overrides,
            &state.config().credentials,
        )))
    }
}

/// Lenient JSON body extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayload<T>(pub T);

impl<T, S> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| RelayError::BadRequest(rejection.body_text()))?;

        parse_body(&bytes).map(Self)
    }
}

fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RelayError> {
    let body = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        bytes
    };

    serde_json::from_slice(body).map_err(|e| RelayError::BadRequest(format!("Invalid JSON body: {e}")))
}
