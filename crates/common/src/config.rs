//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Identity provider configuration.
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this deployment.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Identity provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token issuer URL.
    pub issuer: String,
    /// Expected token audience. When unset, audience is not enforced.
    #[serde(default)]
    pub audience: Option<String>,
    /// JWKS endpoint URL. Defaults to `{issuer}/.well-known/jwks.json`.
    #[serde(default)]
    pub jwks_url: Option<String>,
    /// Seconds a fetched key set stays fresh before a refetch.
    #[serde(default = "default_jwks_ttl_secs")]
    pub jwks_ttl_secs: u64,
    /// Shared secret for identity-provider webhook signatures
    /// (`whsec_`-prefixed).
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

impl AuthConfig {
    /// Resolve the JWKS endpoint, defaulting to the issuer's well-known path.
    #[must_use]
    pub fn jwks_endpoint(&self) -> String {
        self.jwks_url.clone().unwrap_or_else(|| {
            format!("{}/.well-known/jwks.json", self.issuer.trim_end_matches('/'))
        })
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_jwks_ttl_secs() -> u64 {
    600
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `CIRS_ENV`)
    /// 3. Environment variables with `CIRS_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("CIRS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CIRS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CIRS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwks_endpoint_defaults_to_well_known() {
        let auth = AuthConfig {
            issuer: "https://id.example.com/".to_string(),
            audience: None,
            jwks_url: None,
            jwks_ttl_secs: 600,
            webhook_secret: None,
        };
        assert_eq!(
            auth.jwks_endpoint(),
            "https://id.example.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_jwks_endpoint_explicit_url_wins() {
        let auth = AuthConfig {
            issuer: "https://id.example.com".to_string(),
            audience: Some("https://cirs.example.com".to_string()),
            jwks_url: Some("https://keys.example.com/jwks".to_string()),
            jwks_ttl_secs: 600,
            webhook_secret: None,
        };
        assert_eq!(auth.jwks_endpoint(), "https://keys.example.com/jwks");
    }
}
