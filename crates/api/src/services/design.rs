//! Design ideation: trend research, prompt brainstorming and image generation.
//!
//! Prompt texts and list parsing live here so routes stay thin. When the AI
//! key is missing the routes fall back to the static lists below.

use pod_relay_core::{ChatRole, CredentialSet, ImageStyle};
use tracing::instrument;

use crate::error::RelayError;
use crate::openai::{ChatMessage, ChatOptions, GeneratedImage, ImageOptions, OpenAiClient};

pub const DEFAULT_NICHE: &str = "developer";
pub const DEFAULT_STYLE: &str = "minimalist";
pub const DEFAULT_PROMPT_COUNT: usize = 10;
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

const TREND_SYSTEM_PROMPT: &str =
    "You are a design trend expert specializing in print-on-demand products.";
const PROMPT_SYSTEM_PROMPT: &str = "You are a creative director for print-on-demand products.";

/// Returned by the trends route when no AI key is configured.
pub const PLACEHOLDER_TRENDS: [&str; 10] = [
    "Minimalist code snippet designs with syntax highlighting",
    "Retro 80s/90s computer aesthetics with neon colors",
    "Dark mode themed designs with glowing elements",
    "Command line interface mockups with custom commands",
    "Binary/matrix style backgrounds with tech elements",
    "Pixel art programming icons and symbols",
    "Monospace typography with code-inspired layouts",
    "Tech humor: 'Works on my machine' themed designs",
    "IDE screenshot mockups with funny code",
    "Programming language logos in creative arrangements",
];

/// Returned by the prompts route when no AI key is configured.
pub const PLACEHOLDER_PROMPTS: [&str; 10] = [
    "Code never lies, comments sometimes do - in monospace font on black background",
    "Syntax Error: Coffee not found - minimalist design with command line aesthetic",
    "In code we trust - geometric layout with binary background",
    "DevMode: Always On - glowing neon text with circuit board pattern",
    "Function Over Form() - clean typography with code brackets",
    "404: Sleep Not Found - error message styled design",
    "Keep Calm and Debug On - British poster style meets code",
    "CTRL+ALT+COFFEE - keyboard shortcut themed design",
    "While (awake) { code(); } - infinite loop joke in code style",
    "Powered by Coffee & Stack Overflow - dual credit design",
];

pub const PLACEHOLDER_DESIGN_URL: &str = "https://via.placeholder.com/1024x1024?text=DevMode+Design";

/// Image generation backend requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageProvider {
    #[default]
    Dalle,
    /// Not wired; answered with a placeholder image.
    Imagen,
}

impl ImageProvider {
    /// Anything but `imagen` selects DALL-E.
    #[must_use]
    pub fn from_caller(value: &str) -> Self {
        if value.eq_ignore_ascii_case("imagen") {
            Self::Imagen
        } else {
            Self::Dalle
        }
    }
}

/// Placeholder image for providers that need Google Cloud setup.
#[must_use]
pub fn imagen_placeholder_url(size: &str) -> String {
    format!("https://via.placeholder.com/{size}?text=Google+Imagen+(Setup+Required)")
}

/// User message asking for ten trends in `niche`.
#[must_use]
pub fn trend_request(niche: &str, keywords: &[String]) -> String {
    let focus = if keywords.is_empty() {
        String::new()
    } else {
        format!("Focus on these keywords: {}", keywords.join(", "))
    };

    format!(
        "You are a design trend researcher for print-on-demand products.

Generate 10 current design trends for the \"{niche}\" niche that would work well on t-shirts, hoodies, and mugs.
{focus}

Requirements:
- Each trend should be 1-2 sentences
- Focus on visual design styles, not just topics
- Consider what's popular on platforms like Etsy, Redbubble, Amazon Merch
- Think about typography, color schemes, and layout styles
- Trends should be feasible for POD printing

Return only the list of trends, numbered 1-10."
    )
}

/// User message asking for `count` design prompts.
#[must_use]
pub fn prompt_request(niche: &str, style: &str, count: usize) -> String {
    format!(
        "Generate {count} creative t-shirt design prompts for the \"{niche}\" niche with a \"{style}\" style.

Each prompt should:
- Be specific and actionable for a designer
- Include text/slogan when appropriate
- Describe the visual style and layout
- Be suitable for print-on-demand (t-shirts, hoodies, mugs)
- Be trendy and likely to sell

Format: Simple list, one prompt per line, no numbering."
    )
}

/// Split a numbered list into trimmed, non-empty entries.
#[must_use]
pub fn parse_trends(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| strip_numbering(line.trim()).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a bulleted or numbered list into at most `count` entries.
#[must_use]
pub fn parse_prompts(text: &str, count: usize) -> Vec<String> {
    text.lines()
        .map(|line| strip_numbering(strip_bullet(line.trim())).trim())
        .filter(|line| !line.is_empty())
        .take(count)
        .map(str::to_string)
        .collect()
}

/// Append the print-ready style suffix and optional negative prompt.
#[must_use]
pub fn enhance_image_prompt(prompt: &str, negative_prompt: &str) -> String {
    let avoid = if negative_prompt.trim().is_empty() {
        String::new()
    } else {
        format!("AVOID: {negative_prompt}")
    };

    format!(
        "{prompt}. T-shirt graphic design, professional quality, suitable for print-on-demand, \
         transparent background or clean white background, high contrast, vector-style artwork. {avoid}"
    )
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix(['-', '•', '*'])
        .map_or(line, str::trim_start)
}

/// Drop a leading `12.` marker.
fn strip_numbering(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }
    rest.strip_prefix('.').map_or(line, str::trim_start)
}

/// Ask the chat model for design trends.
///
/// # Errors
///
/// Returns the adapter's error unchanged; `RelayError::Config` when the AI
/// key is absent.
#[instrument(skip(openai, credentials, keywords))]
pub async fn generate_trends(
    openai: &OpenAiClient,
    credentials: &CredentialSet,
    niche: &str,
    keywords: &[String],
) -> Result<Vec<String>, RelayError> {
    let reply = openai
        .chat(
            credentials,
            vec![
                ChatMessage::new(ChatRole::System, TREND_SYSTEM_PROMPT),
                ChatMessage::new(ChatRole::User, trend_request(niche, keywords)),
            ],
            ChatOptions::default(),
        )
        .await?;

    Ok(parse_trends(&reply))
}

/// Ask the chat model for `count` design prompts.
///
/// # Errors
///
/// Returns the adapter's error unchanged; `RelayError::Config` when the AI
/// key is absent.
#[instrument(skip(openai, credentials))]
pub async fn generate_prompts(
    openai: &OpenAiClient,
    credentials: &CredentialSet,
    niche: &str,
    style: &str,
    count: usize,
) -> Result<Vec<String>, RelayError> {
    let reply = openai
        .chat(
            credentials,
            vec![
                ChatMessage::new(ChatRole::System, PROMPT_SYSTEM_PROMPT),
                ChatMessage::new(ChatRole::User, prompt_request(niche, style, count)),
            ],
            ChatOptions::default(),
        )
        .await?;

    Ok(parse_prompts(&reply, count))
}

/// Render a design image from the enhanced prompt.
///
/// # Errors
///
/// Returns the adapter's error unchanged; `RelayError::Config` when the AI
/// key is absent.
#[instrument(skip(openai, credentials, prompt, negative_prompt))]
pub async fn generate_design(
    openai: &OpenAiClient,
    credentials: &CredentialSet,
    prompt: &str,
    negative_prompt: &str,
    size: &str,
    style: ImageStyle,
) -> Result<GeneratedImage, RelayError> {
    let enhanced = enhance_image_prompt(prompt, negative_prompt);

    openai
        .generate_image(
            credentials,
            &enhanced,
            ImageOptions {
                size: size.to_string(),
                style,
                ..ImageOptions::default()
            },
        )
        .await
}
