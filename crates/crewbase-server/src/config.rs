//! Server configuration.
//!
//! Configuration loads from a TOML file (default `crewbase.toml`) with
//! `CREWBASE_`-prefixed environment variables layered on top, e.g.
//! `CREWBASE_SERVER__PORT=9090` overrides `[server] port`.

use serde::{Deserialize, Serialize};

use crewbase_auth::config::AuthConfig;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Authentication and authorization configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Bootstrap configuration (initial operator account, registered clients).
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }

        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }

        if let Some(admin) = &self.bootstrap.admin {
            if admin.email.is_empty() {
                return Err("bootstrap.admin.email must not be empty".into());
            }
            if admin.password.len() < 8 {
                return Err("bootstrap.admin.password must be at least 8 characters".into());
            }
        }

        for client in &self.bootstrap.clients {
            if client.client_id.is_empty() {
                return Err("bootstrap.clients entries require a client_id".into());
            }
            if client.redirect_uris.is_empty() {
                return Err(format!(
                    "bootstrap client '{}' requires at least one redirect URI",
                    client.client_id
                ));
            }
        }

        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter. `RUST_LOG` wins over this when set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Bootstrap configuration.
///
/// Seeded into storage at startup; existing records are left untouched, so
/// restarting with the same configuration is idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Initial platform operator account.
    pub admin: Option<BootstrapAdmin>,

    /// Client registrations to seed.
    pub clients: Vec<BootstrapClient>,
}

/// Initial operator account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    /// Operator login email.
    pub email: String,

    /// Operator password (plaintext in config; hashed before storage).
    pub password: String,
}

/// A client registration to seed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapClient {
    /// Unique client identifier.
    pub client_id: String,

    /// Display name for the consent screen.
    pub name: String,

    /// Description for the consent screen.
    #[serde(default)]
    pub description: Option<String>,

    /// Logo URL for the consent screen.
    #[serde(default)]
    pub logo_url: Option<String>,

    /// Allowed redirect URIs.
    pub redirect_uris: Vec<String>,

    /// Allowed scopes (empty means all).
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Loads configuration from the given TOML file and the environment.
///
/// The file is optional; environment variables with the `CREWBASE_` prefix
/// (section separator `__`) override file values.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or the merged
/// configuration fails validation.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }

    let cfg: AppConfig = builder
        .add_source(
            config::Environment::with_prefix("CREWBASE")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| e.to_string())?
        .try_deserialize()
        .map_err(|e| e.to_string())?;

    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_admin_password() {
        let mut config = AppConfig::default();
        config.bootstrap.admin = Some(BootstrapAdmin {
            email: "ops@crewbase.dev".to_string(),
            password: "short".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_client_without_redirects() {
        let mut config = AppConfig::default();
        config.bootstrap.clients.push(BootstrapClient {
            client_id: "c1".to_string(),
            name: "C1".to_string(),
            description: None,
            logo_url: None,
            redirect_uris: vec![],
            scopes: vec![],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[logging]
level = "debug"

[auth]
issuer = "https://sso.crewbase.dev"

[[bootstrap.clients]]
client_id = "dispatch-portal"
name = "Dispatch Portal"
redirect_uris = ["https://dispatch.example.com/callback"]
"#
        )
        .unwrap();

        let config = load_config(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.auth.issuer, "https://sso.crewbase.dev");
        assert_eq!(config.bootstrap.clients.len(), 1);
        assert_eq!(config.bootstrap.clients[0].client_id, "dispatch-portal");
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Some("/nonexistent/crewbase.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
