//! Authorization server configuration.
//!
//! Configuration is organized into logical subsections and deserializes
//! from the `[auth]` table of the server's TOML configuration. Durations
//! use humantime strings ("10m", "1h", "90d").

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root authentication and authorization configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "https://sso.crewbase.dev"
///
/// [auth.oauth]
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "90d"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Public base URL of the authorization server.
    /// Used as the fallback redirect target for cancelled flows.
    pub issuer: String,

    /// OAuth 2.0 configuration.
    pub oauth: OAuthConfig,

    /// Session-version configuration.
    pub session: SessionConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            oauth: OAuthConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// OAuth 2.0 configuration.
///
/// Controls authorization-code and token lifetimes and refresh behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime.
    /// Codes should be short-lived for security.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    /// Shorter lifetimes are more secure but require more frequent refresh.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Rotate refresh tokens on use.
    /// When enabled, a new refresh token is issued with each refresh and
    /// the previous one is revoked.
    pub refresh_token_rotation: bool,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600), // 10 minutes
            access_token_lifetime: Duration::from_secs(3600),      // 1 hour
            refresh_token_lifetime: Duration::from_secs(90 * 24 * 3600), // 90 days
            refresh_token_rotation: true,
        }
    }
}

/// Session-version configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Stamp the `X-Session-Version` header on authenticated responses.
    /// Disabling this turns off client-side forced logout entirely.
    pub version_header_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version_header_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.issuer, "http://localhost:8080");
        assert_eq!(
            config.oauth.authorization_code_lifetime,
            Duration::from_secs(600)
        );
        assert_eq!(config.oauth.access_token_lifetime, Duration::from_secs(3600));
        assert!(config.oauth.refresh_token_rotation);
        assert!(config.session.version_header_enabled);
    }

    #[test]
    fn test_toml_humantime_lifetimes() {
        let toml = r#"
            issuer = "https://sso.crewbase.dev"

            [oauth]
            authorization_code_lifetime = "5m"
            access_token_lifetime = "30m"
            refresh_token_lifetime = "30d"
            refresh_token_rotation = false

            [session]
            version_header_enabled = false
        "#;

        let config: AuthConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.issuer, "https://sso.crewbase.dev");
        assert_eq!(
            config.oauth.authorization_code_lifetime,
            Duration::from_secs(300)
        );
        assert_eq!(
            config.oauth.access_token_lifetime,
            Duration::from_secs(1800)
        );
        assert_eq!(
            config.oauth.refresh_token_lifetime,
            Duration::from_secs(30 * 24 * 3600)
        );
        assert!(!config.oauth.refresh_token_rotation);
        assert!(!config.session.version_header_enabled);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: AuthConfig = toml::from_str(r#"issuer = "https://x.example""#).unwrap();
        assert_eq!(config.issuer, "https://x.example");
        assert_eq!(
            config.oauth.access_token_lifetime,
            Duration::from_secs(3600)
        );
    }
}
