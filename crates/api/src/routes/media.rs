//! Media routes: staged image upload and mockup rendering.

use axum::extract::State;
use chrono::Utc;
use pod_relay_core::{CredentialSet, PlacementSpec, RenderedMockup};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::{Provider, RelayError};
use crate::middleware::{Credentials, JsonPayload};
use crate::printful::{DEFAULT_PRODUCT_ID, DEFAULT_VARIANT_ID, MockupRequest};
use crate::respond::{RelayResult, normalize, or_placeholder};
use crate::shopify::{UploadAsset, UploadOutcome};
use crate::state::AppState;

const DEFAULT_UPLOAD_FILENAME: &str = "design.png";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadImageRequest {
    /// `data:<mime>;base64,<payload>`.
    pub image_base64: Option<String>,
    /// Remote image to copy instead of inline bytes.
    pub image_url: Option<String>,
    pub filename: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    /// Absent while the store is still processing the file.
    pub image_url: Option<String>,
    pub file_id: String,
    pub pending: bool,
}

impl From<UploadOutcome> for UploadImageResponse {
    fn from(outcome: UploadOutcome) -> Self {
        let pending = outcome.is_pending();
        let file = match outcome {
            UploadOutcome::Ready(file) | UploadOutcome::ProcessingPending(file) => file,
        };
        Self {
            image_url: file.public_url,
            file_id: file.remote_id,
            pending,
        }
    }
}

/// Upload an image to the store's file CDN.
///
/// POST /api/upload-image
///
/// # Errors
///
/// Returns `RelayError::BadRequest` when neither image input is given or the
/// data URL is malformed, otherwise the upload workflow's error.
#[instrument(skip(state, credentials, request))]
pub async fn upload_image(
    State(state): State<AppState>,
    Credentials(credentials): Credentials,
    JsonPayload(request): JsonPayload<UploadImageRequest>,
) -> RelayResult<UploadImageResponse> {
    let shopify = state.shopify();
    let alt = request.alt;

    let outcome = if let Some(data_url) = non_blank(request.image_base64) {
        let filename =
            non_blank(request.filename).unwrap_or_else(|| DEFAULT_UPLOAD_FILENAME.to_string());
        let asset = UploadAsset::from_data_url(&data_url, filename)?.with_alt(alt);
        shopify.upload(&credentials, asset).await
    } else if let Some(url) = non_blank(request.image_url) {
        shopify.upload_from_url(&credentials, &url, alt).await
    } else {
        return Err(RelayError::BadRequest(
            "imageBase64 or imageUrl is required".to_string(),
        ));
    };

    normalize(outcome.map(UploadImageResponse::from))
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MockupBody {
    pub product_id: u64,
    pub variant_id: u64,
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
    pub placements: Vec<PlacementSpec>,
    /// Scene hints; accepted and logged, the generator has no such options.
    pub model_gender: Option<String>,
    pub location: Option<String>,
    pub background: Option<String>,
}

impl Default for MockupBody {
    fn default() -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID,
            variant_id: DEFAULT_VARIANT_ID,
            image_url: None,
            image_base64: None,
            placements: Vec::new(),
            model_gender: None,
            location: None,
            background: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupResponse {
    pub mockups: Vec<RenderedMockup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    /// Image the mockups were rendered from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Render product mockups.
///
/// POST /api/mockup
///
/// A base64 image is uploaded to the store first to get a public URL.
/// Without a fulfillment key, answers with two placeholder mockups.
///
/// # Errors
///
/// Returns `RelayError::BadRequest` when neither image input is given or the
/// data URL is malformed, otherwise the upload or render workflow's error.
#[instrument(
    skip(state, credentials, body),
    fields(product_id = body.product_id, variant_id = body.variant_id)
)]
pub async fn mockup(
    State(state): State<AppState>,
    Credentials(credentials): Credentials,
    JsonPayload(body): JsonPayload<MockupBody>,
) -> RelayResult<MockupResponse> {
    if body.model_gender.is_some() || body.location.is_some() || body.background.is_some() {
        tracing::debug!(
            model_gender = ?body.model_gender,
            location = ?body.location,
            background = ?body.background,
            "Mockup scene options requested"
        );
    }

    let source = match (non_blank(body.image_base64), non_blank(body.image_url)) {
        (Some(data_url), _) => {
            let filename = format!("mockup-{}.png", Utc::now().timestamp_millis());
            ImageSource::Inline(UploadAsset::from_data_url(&data_url, filename)?)
        }
        (None, Some(url)) => ImageSource::Remote(url),
        (None, None) => {
            return Err(RelayError::BadRequest(
                "imageUrl or imageBase64 is required".to_string(),
            ));
        }
    };

    let request = MockupRequest {
        product_id: body.product_id,
        variant_id: body.variant_id,
        image_url: String::new(),
        placements: body.placements,
    };

    let cancel = state.request_token();
    let result = if credentials.has_fulfillment() {
        render(&state, &credentials, source, request, &cancel).await
    } else {
        Err(RelayError::Config(Provider::Printful))
    };

    or_placeholder(Provider::Printful, result, || {
        (
            MockupResponse {
                mockups: placeholder_mockups(),
                attempts: None,
                image_url: None,
            },
            "Mock mockups (configure PRINTFUL_API_KEY for real mockups)".to_string(),
        )
    })
}

/// Where the design image comes from.
enum ImageSource {
    /// Decoded data URL, uploaded to the store before rendering.
    Inline(UploadAsset),
    Remote(String),
}

/// Resolve the image to a public URL, then run the render task.
async fn render(
    state: &AppState,
    credentials: &CredentialSet,
    source: ImageSource,
    mut request: MockupRequest,
    cancel: &CancellationToken,
) -> Result<MockupResponse, RelayError> {
    let printful = state.printful();
    let policy = printful.poll_policy();

    request.image_url = match source {
        ImageSource::Remote(url) => url,
        ImageSource::Inline(asset) => match state.shopify().upload(credentials, asset).await? {
            UploadOutcome::Ready(file) => file.public_url.unwrap_or_default(),
            UploadOutcome::ProcessingPending(file) => {
                tracing::info!(file_id = %file.remote_id, "Waiting for uploaded file to process");
                state
                    .shopify()
                    .await_file_url(credentials, &file.remote_id, policy, cancel)
                    .await?
            }
        },
    };

    let render = printful
        .render_mockup(credentials, &request, policy, cancel)
        .await?;

    Ok(MockupResponse {
        mockups: render.mockups,
        attempts: Some(render.attempts),
        image_url: Some(request.image_url),
    })
}

fn placeholder_mockups() -> Vec<RenderedMockup> {
    [("front", "Front"), ("back", "Back")]
        .into_iter()
        .map(|(placement, label)| RenderedMockup {
            url: format!("https://via.placeholder.com/800x800?text={label}+Mockup"),
            placement: placement.to_string(),
            variant_id: None,
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::FileReference;

    #[test]
    fn test_mockup_body_defaults() {
        let body: MockupBody = serde_json::from_str(r#"{"imageUrl": "https://cdn.example/a.png"}"#)
            .expect("deserialize");
        assert_eq!(body.product_id, DEFAULT_PRODUCT_ID);
        assert_eq!(body.variant_id, DEFAULT_VARIANT_ID);
        assert!(body.placements.is_empty());
    }

    #[test]
    fn test_placeholder_mockups() {
        let mockups = placeholder_mockups();
        assert_eq!(mockups.len(), 2);
        assert_eq!(mockups[0].placement, "front");
        assert_eq!(mockups[0].url, "https://via.placeholder.com/800x800?text=Front+Mockup");
        assert_eq!(mockups[1].url, "https://via.placeholder.com/800x800?text=Back+Mockup");
    }

    #[test]
    fn test_upload_response_from_pending_outcome() {
        let response = UploadImageResponse::from(UploadOutcome::ProcessingPending(FileReference {
            remote_id: "gid://shopify/MediaImage/1".to_string(),
            public_url: None,
        }));
        assert!(response.pending);
        assert!(response.image_url.is_none());
        assert_eq!(response.file_id, "gid://shopify/MediaImage/1");
    }
}
