//! Service info, design constants and channel routes.

use axum::{Json, extract::State};
use chrono::{SecondsFormat, Utc};
use pod_relay_core::CredentialSet;
use serde::Serialize;

use crate::middleware::Credentials;
use crate::respond::{Envelope, success};
use crate::state::AppState;

pub const SERVICE_NAME: &str = "pod-creator-api";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub environment: EnvironmentFlags,
}

/// Which process-wide defaults are configured.
#[derive(Debug, Serialize)]
pub struct EnvironmentFlags {
    #[serde(rename = "hasShopify")]
    pub has_shopify: bool,
    #[serde(rename = "hasPrintful")]
    pub has_printful: bool,
    #[serde(rename = "hasOpenAI")]
    pub has_openai: bool,
}

/// Health check.
///
/// GET /health
///
/// Reports the configured defaults only; request headers are ignored.
pub async fn health(State(state): State<AppState>) -> Json<Envelope<HealthResponse>> {
    let defaults = &state.config().credentials;

    success(HealthResponse {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        environment: EnvironmentFlags {
            has_shopify: defaults.has_commerce(),
            has_printful: defaults.has_fulfillment(),
            has_openai: defaults.has_ai(),
        },
    })
}

/// Design style constants for the studio front end.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleA {
    pub dev_mode_px: u32,
    pub slogan_px: u32,
    pub color: &'static str,
    pub layout: &'static str,
    pub canvas: &'static str,
}

pub const STYLE_A: StyleA = StyleA {
    dev_mode_px: 105,
    slogan_px: 400,
    color: "#FFFFFF",
    layout: "left",
    canvas: "4500x5400",
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub bg_tolerance: u32,
}

#[derive(Debug, Serialize)]
pub struct Integrations {
    pub shopify: bool,
    pub printful: bool,
    pub ai: bool,
}

impl From<&CredentialSet> for Integrations {
    fn from(credentials: &CredentialSet) -> Self {
        Self {
            shopify: credentials.has_commerce(),
            printful: credentials.has_fulfillment(),
            ai: credentials.has_ai(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub style_a: StyleA,
    pub thresholds: Thresholds,
    pub integrations: Integrations,
}

/// Design constants and integration capability flags.
///
/// GET /api/config
pub async fn config(Credentials(credentials): Credentials) -> Json<Envelope<ConfigResponse>> {
    success(ConfigResponse {
        style_a: STYLE_A,
        thresholds: Thresholds { bg_tolerance: 12 },
        integrations: Integrations::from(&credentials),
    })
}

#[derive(Debug, Serialize)]
pub struct Channel {
    pub id: &'static str,
    pub name: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ChannelsResponse {
    pub channels: Vec<Channel>,
}

/// Sales channels.
///
/// GET /api/channels
///
/// Etsy is listed but not wired, so it is never enabled.
pub async fn channels(Credentials(credentials): Credentials) -> Json<Envelope<ChannelsResponse>> {
    success(ChannelsResponse {
        channels: vec![
            Channel {
                id: "shopify",
                name: "Shopify",
                enabled: credentials.has_commerce(),
            },
            Channel {
                id: "etsy",
                name: "Etsy",
                enabled: false,
            },
            Channel {
                id: "printful",
                name: "Printful",
                enabled: credentials.has_fulfillment(),
            },
        ],
    })
}
