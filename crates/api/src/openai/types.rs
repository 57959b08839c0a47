//! Request and response types for the `OpenAI` API.

use pod_relay_core::{ChatRole, ImageStyle};
use serde::{Deserialize, Serialize};

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Per-call chat overrides. Unset fields fall back to the configured model,
/// temperature 0.7 and 1000 max tokens.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Image generation options.
#[derive(Debug, Clone)]
pub struct ImageOptions {
    pub size: String,
    pub style: ImageStyle,
    pub quality: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            size: "1024x1024".to_string(),
            style: ImageStyle::Natural,
            quality: "standard".to_string(),
        }
    }
}

/// A generated image.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedImage {
    pub url: String,
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ImageRequest<'a> {
    pub model: &'static str,
    pub prompt: &'a str,
    pub n: u8,
    pub size: &'a str,
    pub quality: &'a str,
    pub style: ImageStyle,
}

#[derive(Debug, Deserialize)]
pub(super) struct ImageResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ImageData {
    pub url: Option<String>,
    pub revised_prompt: Option<String>,
}

/// Error envelope: `{"error": {"message": ..., "type": ...}}`.
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDetail {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_request_serialization() {
        let request = ImageRequest {
            model: "dall-e-3",
            prompt: "A cat",
            n: 1,
            size: "1024x1024",
            quality: "hd",
            style: ImageStyle::Natural,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["style"], "natural");
        assert_eq!(json["quality"], "hd");
        assert_eq!(json["n"], 1);
    }

    #[test]
    fn test_chat_response_null_content() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#)
                .expect("deserialize");
        assert!(response.choices[0].message.content.is_none());
    }
}
