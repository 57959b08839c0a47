//! `OpenAI` chat completion and image generation adapter.

mod types;

pub use types::{ChatMessage, ChatOptions, GeneratedImage, ImageOptions};

use std::sync::Arc;

use pod_relay_core::CredentialSet;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;

use crate::config::OpenAiConfig;
use crate::error::{Provider, RelayError, body_excerpt};

use types::{ApiErrorResponse, ChatRequest, ChatResponse, ImageRequest, ImageResponse};

/// Image model used for design generation.
pub const IMAGE_MODEL: &str = "dall-e-3";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// `OpenAI` API client.
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<OpenAiClientInner>,
}

struct OpenAiClientInner {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a new client sharing `client`'s connection pool.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &OpenAiConfig) -> Self {
        Self {
            inner: Arc::new(OpenAiClientInner {
                client,
                base_url: config.base_url.clone(),
                model: config.model.clone(),
            }),
        }
    }

    /// Send a chat completion and return the first choice's content.
    ///
    /// # Errors
    ///
    /// - `RelayError::Config` if the API key is absent
    /// - `RelayError::Provider` on a non-success status (with `error.message`
    ///   when present) or a response without choices
    #[instrument(skip(self, credentials, messages, options), fields(model))]
    pub async fn chat(
        &self,
        credentials: &CredentialSet,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<String, RelayError> {
        let api_key = api_key(credentials)?;

        let model = options.model.unwrap_or_else(|| self.inner.model.clone());
        tracing::Span::current().record("model", model.as_str());

        let request = ChatRequest {
            model,
            messages,
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };

        let response: ChatResponse = self.post(api_key, "/chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RelayError::provider(Provider::OpenAi, None, "response has no choices"))
    }

    /// Generate one image and return its URL and revised prompt.
    ///
    /// # Errors
    ///
    /// - `RelayError::Config` if the API key is absent
    /// - `RelayError::Provider` on a non-success status (with `error.message`
    ///   when present) or a response without images
    #[instrument(skip(self, credentials, prompt, options), fields(size = %options.size))]
    pub async fn generate_image(
        &self,
        credentials: &CredentialSet,
        prompt: &str,
        options: ImageOptions,
    ) -> Result<GeneratedImage, RelayError> {
        let api_key = api_key(credentials)?;

        let request = ImageRequest {
            model: IMAGE_MODEL,
            prompt,
            n: 1,
            size: &options.size,
            quality: &options.quality,
            style: options.style,
        };

        let response: ImageResponse = self.post(api_key, "/images/generations", &request).await?;

        let image = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::provider(Provider::OpenAi, None, "response has no images"))?;

        Ok(GeneratedImage {
            url: image.url.unwrap_or_default(),
            revised_prompt: image.revised_prompt,
        })
    }

    async fn post<B, T>(&self, api_key: &SecretString, path: &str, body: &B) -> Result<T, RelayError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .client
            .post(format!("{}{path}", self.inner.base_url))
            .bearer_auth(api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| RelayError::transport(Provider::OpenAi, e))?;

        handle_response(response).await
    }
}

/// Handle a response, parsing the body on success.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RelayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| RelayError::transport(Provider::OpenAi, e))?;

    if status.is_success() {
        serde_json::from_str(&body).map_err(|e| {
            RelayError::provider(
                Provider::OpenAi,
                Some(status.as_u16()),
                format!("failed to parse response: {e}"),
            )
        })
    } else {
        tracing::warn!(status = status.as_u16(), body = %body_excerpt(&body), "OpenAI API error");
        Err(parse_error(status, &body))
    }
}

fn api_key(credentials: &CredentialSet) -> Result<&SecretString, RelayError> {
    credentials
        .ai_key
        .as_ref()
        .ok_or(RelayError::Config(Provider::OpenAi))
}

/// Build a provider error from a non-success body.
fn parse_error(status: StatusCode, body: &str) -> RelayError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.as_u16().to_string());

    RelayError::provider(Provider::OpenAi, Some(status.as_u16()), message)
}

#[cfg(test)]
mod tests {
    use pod_relay_core::{ChatRole, ImageStyle};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::RelayConfig;

    fn client(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(
            reqwest::Client::new(),
            &OpenAiConfig {
                base_url: server.uri(),
                ..RelayConfig::default().openai
            },
        )
    }

    fn credentials() -> CredentialSet {
        CredentialSet {
            ai_key: Some(SecretString::from("sk-test")),
            ..CredentialSet::default()
        }
    }

    #[tokio::test]
    async fn test_chat_applies_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.7,
                "max_tokens": 1000,
                "messages": [
                    {"role": "system", "content": "You are terse."},
                    {"role": "user", "content": "Say hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "hi"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server)
            .chat(
                &credentials(),
                vec![
                    ChatMessage::new(ChatRole::System, "You are terse."),
                    ChatMessage::new(ChatRole::User, "Say hi"),
                ],
                ChatOptions::default(),
            )
            .await
            .expect("chat");

        assert_eq!(reply, "hi");
    }

    #[tokio::test]
    async fn test_chat_honors_explicit_zero_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"temperature": 0.0, "model": "gpt-4o"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = ChatOptions {
            model: Some("gpt-4o".to_string()),
            temperature: Some(0.0),
            max_tokens: None,
        };
        let reply = client(&server)
            .chat(&credentials(), vec![ChatMessage::new(ChatRole::User, "x")], options)
            .await
            .expect("chat");

        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn test_chat_missing_key() {
        let server = MockServer::start().await;

        let err = client(&server)
            .chat(&CredentialSet::default(), Vec::new(), ChatOptions::default())
            .await
            .expect_err("missing key");

        assert!(err.is_config_for(Provider::OpenAi));
    }

    #[tokio::test]
    async fn test_chat_surfaces_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit reached for gpt-4o-mini", "type": "requests"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .chat(&credentials(), vec![ChatMessage::new(ChatRole::User, "x")], ChatOptions::default())
            .await
            .expect_err("rate limited");

        assert_eq!(
            err.to_string(),
            "OpenAI API error (429): Rate limit reached for gpt-4o-mini"
        );
    }

    #[tokio::test]
    async fn test_generate_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(json!({
                "model": "dall-e-3",
                "n": 1,
                "size": "1024x1024",
                "quality": "standard",
                "style": "vivid"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1_700_000_000,
                "data": [{"url": "https://images.example.com/design.png", "revised_prompt": "A cat, vector style"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image = client(&server)
            .generate_image(
                &credentials(),
                "A cat",
                ImageOptions {
                    style: ImageStyle::Vivid,
                    ..ImageOptions::default()
                },
            )
            .await
            .expect("image");

        assert_eq!(image.url, "https://images.example.com/design.png");
        assert_eq!(image.revised_prompt.as_deref(), Some("A cat, vector style"));
    }
}
