//! Configuration management for QuoteHub
//!
//! Loads from config files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub providers: ProvidersConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
    /// Source registry; empty means the built-in table
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::builder_with_defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (QUOTEHUB__*)
            .add_source(Environment::with_prefix("QUOTEHUB").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Built-in defaults only, without files or environment
    pub fn defaults() -> Result<Self> {
        Self::builder_with_defaults()?
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = Config::builder()
            // Server defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.default_currency", "BRL")?
            // Cache defaults
            .set_default("cache.freshness_ms", 1000)?
            // Provider defaults
            .set_default("providers.timeout_ms", 2000)?
            .set_default("providers.simulated_latency_ms", 0)?
            .set_default("providers.failure_rate", 0.0)?
            // Persistence defaults
            .set_default("persistence.enabled", true)?
            .set_default("persistence.data_dir", "./data")?
            .set_default("persistence.channel_capacity", 1024)?
            // Logging defaults
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?;
        Ok(builder)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.cache.freshness_ms == 0 {
            bail!("cache.freshness_ms must be greater than zero");
        }
        if self.providers.timeout_ms == 0 {
            bail!("providers.timeout_ms must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.providers.failure_rate) {
            bail!(
                "providers.failure_rate must be between 0 and 1, got {}",
                self.providers.failure_rate
            );
        }
        if self.persistence.channel_capacity == 0 {
            bail!("persistence.channel_capacity must be greater than zero");
        }
        if self.server.default_currency.trim().is_empty() {
            bail!("server.default_currency must not be empty");
        }
        Ok(())
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "addr={}:{} default_currency={} freshness_ms={} timeout_ms={} persistence={} sources={}",
            self.server.host,
            self.server.port,
            self.server.default_currency,
            self.cache.freshness_ms,
            self.providers.timeout_ms,
            if self.persistence.enabled {
                self.persistence.data_dir.as_str()
            } else {
                "off"
            },
            if self.sources.is_empty() {
                "builtin".to_string()
            } else {
                self.sources.len().to_string()
            }
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize_and_validate() {
        let config = AppConfig::defaults().unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.default_currency, "BRL");
        assert_eq!(config.cache.freshness_ms, 1000);
        assert_eq!(config.providers.timeout_ms, 2000);
        assert!(config.persistence.enabled);
        assert!(config.sources.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_out_of_range_failure_rate() {
        let mut config = AppConfig::defaults().unwrap();
        config.providers.failure_rate = 1.5;

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_freshness() {
        let mut config = AppConfig::defaults().unwrap();
        config.cache.freshness_ms = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn digest_mentions_builtin_registry() {
        let config = AppConfig::defaults().unwrap();
        assert!(config.to_string().contains("sources=builtin"));
    }
}
