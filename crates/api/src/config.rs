//! Relay configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional. Missing provider credentials are not an error
//! at startup: operations that need them degrade or fail per request.
//!
//! ## Server
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `ALLOWED_ORIGIN` - Allowed CORS origin, `*` for any (default: `*`)
//! - `PROJECT_ROOT` - Directory scanned by the status check (default: `.`)
//! - `HTTP_TIMEOUT_SECS` - Outbound request timeout (default: 30)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//!
//! ## Commerce (Shopify)
//! - `SHOPIFY_STORE` - Store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `LISTING_VENDOR` - Vendor on created listings (default: `DevMode`)
//! - `LISTING_PRODUCT_TYPE` - Product type on created listings (default: `Apparel`)
//!
//! ## Fulfillment (Printful)
//! - `PRINTFUL_API_KEY` - API key
//! - `PRINTFUL_API_BASE` - API base URL (default: <https://api.printful.com>)
//! - `MOCKUP_POLL_INTERVAL_MS` - Wait between task polls (default: 2000)
//! - `MOCKUP_MAX_ATTEMPTS` - Poll attempt ceiling (default: 10)
//!
//! ## Generative AI (`OpenAI`)
//! - `OPENAI_API_KEY` - API key
//! - `OPENAI_API_BASE` - API base URL (default: <https://api.openai.com/v1>)
//! - `OPENAI_MODEL` - Chat model (default: gpt-4o-mini)
//!
//! ## Error tracking
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pod_relay_core::CredentialSet;
use secrecy::SecretString;
use thiserror::Error;

use crate::poll::PollPolicy;

pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2025-01";
pub const DEFAULT_PRINTFUL_API_BASE: &str = "https://api.printful.com";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Common placeholder values copied from sample `.env` files (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "placeholder",
    "xxx",
    "replace",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Relay application configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// CORS policy for inbound browser calls
    pub allowed_origin: AllowedOrigin,
    /// Process-wide credential defaults (overridable per request)
    pub credentials: CredentialSet,
    /// Commerce platform settings
    pub shopify: ShopifyConfig,
    /// Fulfillment platform settings
    pub printful: PrintfulConfig,
    /// Generative AI platform settings
    pub openai: OpenAiConfig,
    /// Timeout applied to every outbound request
    pub http_timeout: Duration,
    /// Directory scanned by the local status check
    pub project_root: PathBuf,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Allowed origin policy for CORS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigin {
    /// Any origin (`*`).
    Any,
    /// Exactly this origin.
    Exact(String),
}

impl AllowedOrigin {
    fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "*" {
            Self::Any
        } else {
            Self::Exact(value.trim_end_matches('/').to_string())
        }
    }
}

/// Commerce platform settings.
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// Admin API version (e.g., 2025-01)
    pub api_version: String,
    /// Vendor written on created listings
    pub listing_vendor: String,
    /// Product type written on created listings
    pub listing_product_type: String,
}

/// Fulfillment platform settings.
#[derive(Debug, Clone)]
pub struct PrintfulConfig {
    /// API base URL
    pub base_url: String,
    /// Mockup task polling policy
    pub poll: PollPolicy,
}

/// Generative AI platform settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API base URL
    pub base_url: String,
    /// Default chat model
    pub model: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            allowed_origin: AllowedOrigin::Any,
            credentials: CredentialSet::default(),
            shopify: ShopifyConfig {
                api_version: DEFAULT_SHOPIFY_API_VERSION.to_string(),
                listing_vendor: "DevMode".to_string(),
                listing_product_type: "Apparel".to_string(),
            },
            printful: PrintfulConfig {
                base_url: DEFAULT_PRINTFUL_API_BASE.to_string(),
                poll: PollPolicy::default(),
            },
            openai: OpenAiConfig {
                base_url: DEFAULT_OPENAI_API_BASE.to_string(),
                model: DEFAULT_OPENAI_MODEL.to_string(),
            },
            http_timeout: Duration::from_secs(30),
            project_root: PathBuf::from("."),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let host = parse_env_or("HOST", defaults.host)?;
        let port = parse_env_or("PORT", defaults.port)?;
        let allowed_origin = AllowedOrigin::parse(&get_env_or_default("ALLOWED_ORIGIN", "*"));

        let credentials = CredentialSet {
            commerce_domain: get_optional_env("SHOPIFY_STORE"),
            commerce_token: get_optional_secret("SHOPIFY_ACCESS_TOKEN"),
            fulfillment_key: get_optional_secret("PRINTFUL_API_KEY"),
            ai_key: get_optional_secret("OPENAI_API_KEY"),
        };

        let shopify = ShopifyConfig {
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
            listing_vendor: get_env_or_default("LISTING_VENDOR", &defaults.shopify.listing_vendor),
            listing_product_type: get_env_or_default(
                "LISTING_PRODUCT_TYPE",
                &defaults.shopify.listing_product_type,
            ),
        };

        let poll_interval_ms: u64 = parse_env_or("MOCKUP_POLL_INTERVAL_MS", 2000)?;
        let max_attempts: u32 = parse_env_or("MOCKUP_MAX_ATTEMPTS", 10)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MOCKUP_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let printful = PrintfulConfig {
            base_url: trim_base(&get_env_or_default("PRINTFUL_API_BASE", DEFAULT_PRINTFUL_API_BASE)),
            poll: PollPolicy::new(Duration::from_millis(poll_interval_ms), max_attempts),
        };

        let openai = OpenAiConfig {
            base_url: trim_base(&get_env_or_default("OPENAI_API_BASE", DEFAULT_OPENAI_API_BASE)),
            model: get_env_or_default("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
        };

        let http_timeout = Duration::from_secs(parse_env_or("HTTP_TIMEOUT_SECS", 30)?);
        let project_root = PathBuf::from(get_env_or_default("PROJECT_ROOT", "."));
        let log_json = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            allowed_origin,
            credentials,
            shopify,
            printful,
            openai,
            http_timeout,
            project_root,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an optional secret, warning when it looks like a sample value.
fn get_optional_secret(key: &str) -> Option<SecretString> {
    get_optional_env(key).map(|value| {
        if let Some(pattern) = placeholder_pattern(&value) {
            tracing::warn!("{key} appears to be a placeholder (contains '{pattern}')");
        }
        SecretString::from(value)
    })
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Return the first placeholder pattern found in `secret`.
fn placeholder_pattern(secret: &str) -> Option<&'static str> {
    let lower = secret.to_lowercase();
    PLACEHOLDER_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lower.contains(pattern))
}
