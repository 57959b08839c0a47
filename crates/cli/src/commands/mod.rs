//! Subcommand implementations.

pub mod catalog;
pub mod mockup;
pub mod status;
pub mod upload;

use pod_relay_api::config::{ConfigError, RelayConfig};
use pod_relay_api::error::RelayError;
use pod_relay_api::state::AppState;
use thiserror::Error;

/// Errors from the upstream commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// A local file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The upstream workflow failed.
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Load the environment configuration and build the upstream clients.
fn load_state() -> Result<AppState, CommandError> {
    let config = RelayConfig::from_env()?;
    Ok(AppState::new(config)?)
}
