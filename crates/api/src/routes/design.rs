//! AI design routes: trends, prompts and design images.

use axum::extract::State;
use pod_relay_core::ImageStyle;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{Provider, RelayError};
use crate::middleware::{Credentials, JsonPayload};
use crate::respond::{RelayResult, or_placeholder, placeholder};
use crate::services::design::{
    self, DEFAULT_IMAGE_SIZE, DEFAULT_NICHE, DEFAULT_PROMPT_COUNT, DEFAULT_STYLE, ImageProvider,
    PLACEHOLDER_DESIGN_URL, PLACEHOLDER_PROMPTS, PLACEHOLDER_TRENDS,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrendsRequest {
    pub niche: String,
    pub keywords: Vec<String>,
}

impl Default for TrendsRequest {
    fn default() -> Self {
        Self {
            niche: DEFAULT_NICHE.to_string(),
            keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub trends: Vec<String>,
}

/// Design trends for a niche.
///
/// POST /api/trends
///
/// Without an AI key, answers with a fixed sample list.
///
/// # Errors
///
/// Returns `RelayError` for upstream failures.
#[instrument(skip(state, credentials, request), fields(niche = %request.niche))]
pub async fn trends(
    State(state): State<AppState>,
    Credentials(credentials): Credentials,
    JsonPayload(request): JsonPayload<TrendsRequest>,
) -> RelayResult<TrendsResponse> {
    let result = design::generate_trends(
        state.openai(),
        &credentials,
        &request.niche,
        &request.keywords,
    )
    .await
    .map(|trends| TrendsResponse { trends });

    or_placeholder(Provider::OpenAi, result, || {
        (
            TrendsResponse {
                trends: to_strings(&PLACEHOLDER_TRENDS),
            },
            "Sample trends (OpenAI API key not configured)".to_string(),
        )
    })
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PromptsRequest {
    pub niche: String,
    pub style: String,
    pub count: usize,
}

impl Default for PromptsRequest {
    fn default() -> Self {
        Self {
            niche: DEFAULT_NICHE.to_string(),
            style: DEFAULT_STYLE.to_string(),
            count: DEFAULT_PROMPT_COUNT,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PromptsResponse {
    pub prompts: Vec<String>,
}

/// Design prompts for a niche and style.
///
/// POST /api/prompts
///
/// Without an AI key, answers with a fixed sample list.
///
/// # Errors
///
/// Returns `RelayError` for upstream failures.
#[instrument(skip(state, credentials, request), fields(niche = %request.niche, count = request.count))]
pub async fn prompts(
    State(state): State<AppState>,
    Credentials(credentials): Credentials,
    JsonPayload(request): JsonPayload<PromptsRequest>,
) -> RelayResult<PromptsResponse> {
    let result = design::generate_prompts(
        state.openai(),
        &credentials,
        &request.niche,
        &request.style,
        request.count,
    )
    .await
    .map(|prompts| PromptsResponse { prompts });

    or_placeholder(Provider::OpenAi, result, || {
        (
            PromptsResponse {
                prompts: to_strings(&PLACEHOLDER_PROMPTS),
            },
            "Sample prompts (OpenAI API key not configured)".to_string(),
        )
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateDesignRequest {
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub size: Option<String>,
    pub style: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignResponse {
    pub image_url: String,
    #[serde(rename = "revised_prompt")]
    pub revised_prompt: Option<String>,
}

/// Generate a design image.
///
/// POST /api/generate-design
///
/// `provider: "imagen"` is not wired and always answers with a placeholder.
///
/// # Errors
///
/// Returns `RelayError::BadRequest` when `prompt` is missing, otherwise
/// `RelayError` for upstream failures.
#[instrument(skip(state, credentials, request))]
pub async fn generate_design(
    State(state): State<AppState>,
    Credentials(credentials): Credentials,
    JsonPayload(request): JsonPayload<GenerateDesignRequest>,
) -> RelayResult<DesignResponse> {
    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| RelayError::BadRequest("prompt is required".to_string()))?;
    let size = request
        .size
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string());

    let provider = request
        .provider
        .as_deref()
        .map_or_else(ImageProvider::default, ImageProvider::from_caller);

    if provider == ImageProvider::Imagen {
        return Ok(placeholder(
            DesignResponse {
                image_url: design::imagen_placeholder_url(&size),
                revised_prompt: Some(prompt),
            },
            "Google Imagen requires Google Cloud setup (GOOGLE_CLOUD_PROJECT_ID or GOOGLE_API_KEY)",
        ));
    }

    let style = request
        .style
        .as_deref()
        .map_or_else(ImageStyle::default, ImageStyle::from_caller);

    let result = design::generate_design(
        state.openai(),
        &credentials,
        &prompt,
        request.negative_prompt.as_deref().unwrap_or_default(),
        &size,
        style,
    )
    .await
    .map(|image| DesignResponse {
        image_url: image.url,
        revised_prompt: image.revised_prompt,
    });

    or_placeholder(Provider::OpenAi, result, || {
        (
            DesignResponse {
                image_url: PLACEHOLDER_DESIGN_URL.to_string(),
                revised_prompt: Some(prompt),
            },
            "Mock image (configure OPENAI_API_KEY for real generation)".to_string(),
        )
    })
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
