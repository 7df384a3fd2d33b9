use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::token::service::RotationSettings;

/// Application configuration for token-service.
///
/// Loaded from configuration files with environment variable overrides.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub tokens: TokensConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Access token signing configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_seconds: i64,
}

/// Refresh token lifecycle configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct TokensConfig {
    pub refresh_ttl_seconds: i64,
    /// Server-side key of the refresh token lookup digest
    pub digest_key: String,
    pub seal_at_rest: bool,
    pub store_timeout_ms: u64,
    pub sweep_interval_seconds: u64,
}

impl JwtConfig {
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_ttl_seconds)
    }
}

impl TokensConfig {
    pub fn rotation_settings(&self) -> RotationSettings {
        RotationSettings {
            refresh_ttl: chrono::Duration::seconds(self.refresh_ttl_seconds),
            store_timeout: std::time::Duration::from_millis(self.store_timeout_ms),
            seal_at_rest: self.seal_at_rest,
        }
    }

    /// Sweep period, never shorter than one second.
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_seconds.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval_seconds == 0 {
            return Err(ConfigError::Message(
                "tokens.sweep_interval_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, TOKENS__DIGEST_KEY, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("database.max_connections", 5)?
            .set_default("tokens.seal_at_rest", false)?
            .set_default("tokens.store_timeout_ms", 2000)?
            .set_default("tokens.sweep_interval_seconds", 300)?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.tokens.validate()?;

        Ok(config)
    }
}
