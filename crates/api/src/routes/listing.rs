//! Listing routes: draft creation and publishing.

use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::{Provider, RelayError};
use crate::middleware::{Credentials, JsonPayload};
use crate::respond::{RelayResult, or_placeholder};
use crate::shopify::{CreatedListing, ListingDraft, PublishedListing};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub listing_id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Value>,
}

impl From<CreatedListing> for ListingResponse {
    fn from(listing: CreatedListing) -> Self {
        Self {
            listing_id: listing.listing_id,
            admin_url: Some(listing.admin_url),
            product: Some(listing.product),
        }
    }
}

/// Create a draft product.
///
/// POST /api/listing
///
/// Without store credentials, answers with a `MOCK-<millis>` listing id.
///
/// # Errors
///
/// Returns `RelayError::BadRequest` when `title` is missing, otherwise the
/// store's error (e.g. a 422 with its validation messages).
#[instrument(skip(state, credentials, draft), fields(title = %draft.title))]
pub async fn create(
    State(state): State<AppState>,
    Credentials(credentials): Credentials,
    JsonPayload(draft): JsonPayload<ListingDraft>,
) -> RelayResult<ListingResponse> {
    if draft.title.trim().is_empty() {
        return Err(RelayError::BadRequest("title is required".to_string()));
    }

    let result = state
        .shopify()
        .create_listing(&credentials, &draft)
        .await
        .map(ListingResponse::from);

    or_placeholder(Provider::Shopify, result, || {
        (
            ListingResponse {
                listing_id: Value::String(format!("MOCK-{}", Utc::now().timestamp_millis())),
                admin_url: None,
                product: None,
            },
            "Mock listing created (configure Shopify credentials for real listings)".to_string(),
        )
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublishRequest {
    /// Numeric or string product id.
    pub listing_id: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Value>,
}

impl From<PublishedListing> for PublishResponse {
    fn from(listing: PublishedListing) -> Self {
        Self {
            url: listing.url,
            admin_url: Some(listing.admin_url),
            product: Some(listing.product),
        }
    }
}

/// Set a draft product active.
///
/// POST /api/publish
///
/// Without store credentials, answers with an example storefront URL.
///
/// # Errors
///
/// Returns `RelayError::BadRequest` when `listingId` is missing, otherwise
/// the store's error.
#[instrument(skip(state, credentials, request))]
pub async fn publish(
    State(state): State<AppState>,
    Credentials(credentials): Credentials,
    JsonPayload(request): JsonPayload<PublishRequest>,
) -> RelayResult<PublishResponse> {
    let listing_id = request
        .listing_id
        .as_ref()
        .and_then(listing_id_text)
        .ok_or_else(|| RelayError::BadRequest("listingId is required".to_string()))?;

    let result = state
        .shopify()
        .publish_listing(&credentials, &listing_id)
        .await
        .map(PublishResponse::from);

    or_placeholder(Provider::Shopify, result, || {
        (
            PublishResponse {
                url: format!("https://example.myshopify.com/products/demo-product-{listing_id}"),
                admin_url: None,
                product: None,
            },
            "Mock publish (configure Shopify credentials for real publishing)".to_string(),
        )
    })
}

/// A non-blank string or a number, as text.
fn listing_id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
