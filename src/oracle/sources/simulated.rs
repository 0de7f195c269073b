//! Simulated exchange-house quotes
//!
//! Stands in for scraping the public quote pages. Each source draws a buy
//! price from its own band and adds its own spread to get the sell price.

use anyhow::{bail, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use crate::oracle::sources::QuoteProvider;
use crate::types::{Currency, PricePair};

/// Knobs shared by every simulated source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSettings {
    /// Artificial delay before answering
    pub latency: Duration,
    /// Probability (0.0 - 1.0) that a fetch fails internally
    pub failure_rate: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            failure_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    name: &'static str,
    buy_low: f64,
    buy_high: f64,
    spread: f64,
    settings: SimulationSettings,
}

impl SimulatedProvider {
    pub fn new(
        name: &'static str,
        buy_low: f64,
        buy_high: f64,
        spread: f64,
        settings: &SimulationSettings,
    ) -> Self {
        Self {
            name,
            buy_low,
            buy_high,
            spread,
            settings: *settings,
        }
    }

    fn draw(&self) -> Option<PricePair> {
        let mut rng = rand::thread_rng();
        if self.settings.failure_rate > 0.0 && rng.gen_bool(self.settings.failure_rate.min(1.0)) {
            return None;
        }
        let buy = if self.buy_high > self.buy_low {
            rng.gen_range(self.buy_low..self.buy_high)
        } else {
            self.buy_low
        };
        Some(PricePair::new(buy, buy + self.spread))
    }
}

#[async_trait]
impl QuoteProvider for SimulatedProvider {
    async fn fetch(&self, currency: &Currency) -> Result<PricePair> {
        if !self.settings.latency.is_zero() {
            tokio::time::sleep(self.settings.latency).await;
        }

        match self.draw() {
            Some(pair) => Ok(pair),
            None => bail!("{} quote page unavailable for {}", self.name, currency),
        }
    }
}
