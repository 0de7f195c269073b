//! Configuration section types

use serde::Deserialize;
use std::time::Duration;

use crate::oracle::sources::SimulationSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Currency used when a request has no `currency` parameter
    pub default_currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long an average/slippage bundle is served from cache
    pub freshness_ms: u64,
}

impl CacheConfig {
    pub fn freshness(&self) -> Duration {
        Duration::from_millis(self.freshness_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Per-source timeout before falling back to the zero sentinel
    pub timeout_ms: u64,
    /// Artificial delay of simulated sources
    pub simulated_latency_ms: u64,
    /// Probability (0.0 - 1.0) that a simulated source fails
    pub failure_rate: f64,
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn simulation(&self) -> SimulationSettings {
        SimulationSettings {
            latency: Duration::from_millis(self.simulated_latency_ms),
            failure_rate: self.failure_rate,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Write the quote log and cache mirror
    pub enabled: bool,
    /// Data directory
    pub data_dir: String,
    /// Records buffered between request handlers and the writer task
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// One entry of the `[[sources]]` list
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub currency: String,
    /// Provider implementation (ambito, dolarhoy, cronista, wise, nubank, nomad, fixed)
    pub name: String,
    /// Key reported as the quote's `source`
    pub identifier: String,
    /// Only used by `fixed`
    #[serde(default)]
    pub buy_price: Option<f64>,
    /// Only used by `fixed`
    #[serde(default)]
    pub sell_price: Option<f64>,
}
