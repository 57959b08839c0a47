//! Draft product listings over the REST Admin API.

use std::str::FromStr;

use pod_relay_core::CredentialSet;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use super::{ShopifyClient, commerce_base};
use crate::error::{Provider, RelayError};

const DEFAULT_SIZE: &str = "M";
const DEFAULT_COLOR: &str = "Black";

/// Default listing price when the caller sends none (29.99).
#[must_use]
pub fn default_price() -> Decimal {
    Decimal::new(2999, 2)
}

/// A product to create as a draft.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: Option<Decimal>,
    /// Image source URLs.
    pub images: Vec<String>,
    pub variants: Vec<ListingVariant>,
}

/// A size/color option pair with an optional price override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingVariant {
    pub size: Option<String>,
    pub color: Option<String>,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: Option<Decimal>,
}

/// A listing created on the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedListing {
    pub listing_id: Value,
    pub admin_url: String,
    pub product: Value,
}

/// A listing switched to active.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedListing {
    /// Public storefront URL.
    pub url: String,
    pub admin_url: String,
    pub product: Value,
}

impl ListingDraft {
    /// Effective listing price.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price.unwrap_or_else(default_price)
    }

    /// REST `product` payload for this draft.
    #[must_use]
    pub fn to_product_payload(&self, vendor: &str, product_type: &str) -> Value {
        let price = self.price();

        let variants: Vec<Value> = if self.variants.is_empty() {
            vec![json!({
                "price": price.to_string(),
                "inventory_management": null,
            })]
        } else {
            self.variants
                .iter()
                .map(|v| {
                    json!({
                        "option1": non_blank(v.size.as_deref()).unwrap_or(DEFAULT_SIZE),
                        "option2": non_blank(v.color.as_deref()).unwrap_or(DEFAULT_COLOR),
                        "price": v.price.unwrap_or(price).to_string(),
                        "inventory_management": "shopify",
                        "inventory_quantity": 0,
                    })
                })
                .collect()
        };

        let images: Vec<Value> = self.images.iter().map(|src| json!({ "src": src })).collect();

        json!({
            "product": {
                "title": self.title,
                "body_html": self.description,
                "vendor": vendor,
                "product_type": product_type,
                "tags": self.tags.join(", "),
                "status": "draft",
                "variants": variants,
                "images": images,
            }
        })
    }
}

impl ShopifyClient {
    /// Create a draft product.
    ///
    /// # Errors
    ///
    /// Returns the REST adapter's errors, or `RelayError::Provider` if the
    /// response carries no product id.
    #[instrument(skip(self, credentials, draft), fields(title = %draft.title))]
    pub async fn create_listing(
        &self,
        credentials: &CredentialSet,
        draft: &ListingDraft,
    ) -> Result<CreatedListing, RelayError> {
        let payload =
            draft.to_product_payload(&self.inner.listing_vendor, &self.inner.listing_product_type);

        let mut body = self
            .rest(credentials, Method::POST, "/products.json", Some(&payload))
            .await?;
        let product = take_product(&mut body)?;

        let listing_id = product
            .get("id")
            .cloned()
            .filter(|id| !id.is_null())
            .ok_or_else(|| {
                RelayError::provider(Provider::Shopify, None, "created product has no id")
            })?;

        tracing::info!(listing_id = %listing_id, "Draft listing created");

        Ok(CreatedListing {
            admin_url: admin_product_url(credentials, &id_text(&listing_id)),
            listing_id,
            product,
        })
    }

    /// Set a product's status to active.
    ///
    /// # Errors
    ///
    /// Returns the REST adapter's errors.
    #[instrument(skip(self, credentials))]
    pub async fn publish_listing(
        &self,
        credentials: &CredentialSet,
        listing_id: &str,
    ) -> Result<PublishedListing, RelayError> {
        let id = u64::from_str(listing_id).map_or_else(|_| json!(listing_id), |n| json!(n));
        let payload = json!({ "product": { "id": id, "status": "active" } });

        let mut body = self
            .rest(
                credentials,
                Method::PUT,
                &format!("/products/{}.json", urlencoding::encode(listing_id)),
                Some(&payload),
            )
            .await?;
        let product = take_product(&mut body)?;

        let handle = product
            .get("handle")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let domain = credentials.commerce_domain.as_deref().unwrap_or_default();

        Ok(PublishedListing {
            url: storefront_url(domain, &handle),
            admin_url: admin_product_url(credentials, listing_id),
            product,
        })
    }
}

/// Public product URL for a store domain and product handle.
///
/// The `.myshopify.com` suffix is dropped from the host.
#[must_use]
pub fn storefront_url(domain: &str, handle: &str) -> String {
    let base = commerce_base(domain).replacen(".myshopify.com", "", 1);
    format!("{base}/products/{handle}")
}

fn admin_product_url(credentials: &CredentialSet, listing_id: &str) -> String {
    let domain = credentials.commerce_domain.as_deref().unwrap_or_default();
    format!("{}/admin/products/{listing_id}", commerce_base(domain))
}

fn take_product(body: &mut Value) -> Result<Value, RelayError> {
    body.get_mut("product")
        .map(Value::take)
        .filter(Value::is_object)
        .ok_or_else(|| RelayError::provider(Provider::Shopify, None, "response has no product"))
}

fn id_text(id: &Value) -> String {
    id.as_str().map_or_else(|| id.to_string(), str::to_string)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accept prices as JSON numbers or strings.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PriceInput {
        Number(serde_json::Number),
        Text(String),
    }

    match Option::<PriceInput>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PriceInput::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(PriceInput::Text(text)) => Decimal::from_str(text.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(PriceInput::Number(number)) => Decimal::from_str(&number.to_string())
            .or_else(|_| Decimal::from_scientific(&number.to_string()))
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
