//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::RelayConfig;
use crate::openai::OpenAiClient;
use crate::printful::PrintfulClient;
use crate::shopify::ShopifyClient;

/// Idle pooled connections kept per upstream host.
const POOL_MAX_IDLE_PER_HOST: usize = 16;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. All three adapters share one pooled
/// `reqwest::Client`. Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RelayConfig,
    shopify: ShopifyClient,
    printful: PrintfulClient,
    openai: OpenAiClient,
    shutdown: CancellationToken,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialization failure).
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .user_agent(concat!("pod-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let shopify = ShopifyClient::new(client.clone(), &config.shopify);
        let printful = PrintfulClient::new(client.clone(), &config.printful);
        let openai = OpenAiClient::new(client, &config.openai);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                shopify,
                printful,
                openai,
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Get a reference to the relay configuration.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn shopify(&self) -> &ShopifyClient {
        &self.inner.shopify
    }

    #[must_use]
    pub fn printful(&self) -> &PrintfulClient {
        &self.inner.printful
    }

    #[must_use]
    pub fn openai(&self) -> &OpenAiClient {
        &self.inner.openai
    }

    /// Root token, cancelled on graceful shutdown.
    #[must_use]
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    /// A token for one request's polling loops.
    ///
    /// Cancelled with the root token; dropping it has no effect on others.
    #[must_use]
    pub fn request_token(&self) -> CancellationToken {
        self.inner.shutdown.child_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_token_follows_shutdown() {
        let state = AppState::new(RelayConfig::default()).expect("state");
        let token = state.request_token();

        assert!(!token.is_cancelled());
        state.shutdown_token().cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_request_tokens_are_independent() {
        let state = AppState::new(RelayConfig::default()).expect("state");
        let first = state.request_token();
        let second = state.request_token();

        first.cancel();

        assert!(!second.is_cancelled());
        assert!(!state.shutdown_token().is_cancelled());
    }
}
