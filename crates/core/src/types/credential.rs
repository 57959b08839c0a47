//! Provider credential types.
//!
//! A [`CredentialSet`] is resolved once per request by merging the caller's
//! overrides over the process-wide defaults. It is immutable afterwards and is
//! passed explicitly to every adapter call.

use secrecy::{ExposeSecret, SecretString};

/// The resolved, request-scoped bundle of provider credentials.
///
/// Every field is optional. A missing field is not an error here: the adapter
/// that needs it reports a configuration error when it is called.
///
/// Implements `Debug` manually to redact the secret fields.
#[derive(Clone, Default)]
pub struct CredentialSet {
    /// Commerce store domain (e.g., `your-store.myshopify.com`).
    pub commerce_domain: Option<String>,
    /// Commerce Admin API access token.
    pub commerce_token: Option<SecretString>,
    /// Fulfillment API key (bearer token).
    pub fulfillment_key: Option<SecretString>,
    /// Generative AI API key.
    pub ai_key: Option<SecretString>,
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("commerce_domain", &self.commerce_domain)
            .field("commerce_token", &redacted(self.commerce_token.as_ref()))
            .field("fulfillment_key", &redacted(self.fulfillment_key.as_ref()))
            .field("ai_key", &redacted(self.ai_key.as_ref()))
            .finish()
    }
}

fn redacted(secret: Option<&SecretString>) -> Option<&'static str> {
    secret.map(|_| "[REDACTED]")
}

impl CredentialSet {
    /// Merge per-request overrides over process-wide defaults.
    ///
    /// Each field is the override if present, else the default if present,
    /// else absent. Blank overrides (empty or whitespace-only) count as absent.
    #[must_use]
    pub fn resolve(overrides: &Self, defaults: &Self) -> Self {
        Self {
            commerce_domain: pick_plain(
                overrides.commerce_domain.as_ref(),
                defaults.commerce_domain.as_ref(),
            ),
            commerce_token: pick_secret(
                overrides.commerce_token.as_ref(),
                defaults.commerce_token.as_ref(),
            ),
            fulfillment_key: pick_secret(
                overrides.fulfillment_key.as_ref(),
                defaults.fulfillment_key.as_ref(),
            ),
            ai_key: pick_secret(overrides.ai_key.as_ref(), defaults.ai_key.as_ref()),
        }
    }

    /// Whether both commerce fields are present.
    #[must_use]
    pub const fn has_commerce(&self) -> bool {
        self.commerce_domain.is_some() && self.commerce_token.is_some()
    }

    /// Whether the fulfillment key is present.
    #[must_use]
    pub const fn has_fulfillment(&self) -> bool {
        self.fulfillment_key.is_some()
    }

    /// Whether the AI key is present.
    #[must_use]
    pub const fn has_ai(&self) -> bool {
        self.ai_key.is_some()
    }
}

fn pick_plain(over: Option<&String>, default: Option<&String>) -> Option<String> {
    over.filter(|v| !v.trim().is_empty())
        .or_else(|| default.filter(|v| !v.trim().is_empty()))
        .map(|v| v.trim().to_string())
}

fn pick_secret(over: Option<&SecretString>, default: Option<&SecretString>) -> Option<SecretString> {
    over.filter(|v| !v.expose_secret().trim().is_empty())
        .or_else(|| default.filter(|v| !v.expose_secret().trim().is_empty()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> Option<SecretString> {
        Some(SecretString::from(value))
    }

    fn full(tag: &str) -> CredentialSet {
        CredentialSet {
            commerce_domain: Some(format!("{tag}.myshopify.com")),
            commerce_token: secret(&format!("{tag}-token")),
            fulfillment_key: secret(&format!("{tag}-printful")),
            ai_key: secret(&format!("{tag}-openai")),
        }
    }

    fn expose(value: Option<&SecretString>) -> Option<&str> {
        value.map(ExposeSecret::expose_secret)
    }

    #[test]
    fn test_override_wins_for_every_field() {
        let resolved = CredentialSet::resolve(&full("override"), &full("default"));

        assert_eq!(
            resolved.commerce_domain.as_deref(),
            Some("override.myshopify.com")
        );
        assert_eq!(expose(resolved.commerce_token.as_ref()), Some("override-token"));
        assert_eq!(
            expose(resolved.fulfillment_key.as_ref()),
            Some("override-printful")
        );
        assert_eq!(expose(resolved.ai_key.as_ref()), Some("override-openai"));
    }

    #[test]
    fn test_defaults_fill_missing_overrides() {
        let overrides = CredentialSet {
            ai_key: secret("caller-key"),
            ..CredentialSet::default()
        };
        let resolved = CredentialSet::resolve(&overrides, &full("default"));

        assert_eq!(expose(resolved.ai_key.as_ref()), Some("caller-key"));
        assert_eq!(
            resolved.commerce_domain.as_deref(),
            Some("default.myshopify.com")
        );
        assert_eq!(
            expose(resolved.fulfillment_key.as_ref()),
            Some("default-printful")
        );
    }

    #[test]
    fn test_absent_everywhere_stays_absent() {
        let resolved = CredentialSet::resolve(&CredentialSet::default(), &CredentialSet::default());
        assert!(!resolved.has_commerce());
        assert!(!resolved.has_fulfillment());
        assert!(!resolved.has_ai());
    }

    #[test]
    fn test_blank_override_falls_through_to_default() {
        let overrides = CredentialSet {
            commerce_domain: Some("   ".to_string()),
            fulfillment_key: secret(""),
            ..CredentialSet::default()
        };
        let resolved = CredentialSet::resolve(&overrides, &full("default"));

        assert_eq!(
            resolved.commerce_domain.as_deref(),
            Some("default.myshopify.com")
        );
        assert_eq!(
            expose(resolved.fulfillment_key.as_ref()),
            Some("default-printful")
        );
    }

    #[test]
    fn test_has_commerce_requires_domain_and_token() {
        let only_domain = CredentialSet {
            commerce_domain: Some("shop.myshopify.com".to_string()),
            ..CredentialSet::default()
        };
        assert!(!only_domain.has_commerce());
        assert!(full("x").has_commerce());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", full("visible"));

        assert!(debug_output.contains("visible.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("visible-token"));
        assert!(!debug_output.contains("visible-openai"));
    }
}
