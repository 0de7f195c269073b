//! Quote source implementations (simulated exchange houses and fixed quotes)

mod fixed;
mod simulated;

pub use fixed::FixedProvider;
pub use simulated::{SimulatedProvider, SimulationSettings};

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::oracle::registry::RegisteredSource;
use crate::types::{Currency, PricePair};

/// Trait for quote providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the current buy/sell pair for a currency
    async fn fetch(&self, currency: &Currency) -> Result<PricePair>;
}

/// Known provider implementations, selected by the source name in the registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProviderKind {
    Ambito,
    DolarHoy,
    Cronista,
    Wise,
    Nubank,
    Nomad,
    Fixed { buy_price: f64, sell_price: f64 },
}

impl ProviderKind {
    /// Resolve a provider from its configured name.
    ///
    /// `fixed` needs both prices; every other name ignores them.
    pub fn from_name(name: &str, buy_price: Option<f64>, sell_price: Option<f64>) -> Result<Self> {
        let kind = match name.trim().to_lowercase().as_str() {
            "ambito" => ProviderKind::Ambito,
            "dolarhoy" => ProviderKind::DolarHoy,
            "cronista" => ProviderKind::Cronista,
            "wise" => ProviderKind::Wise,
            "nubank" => ProviderKind::Nubank,
            "nomad" => ProviderKind::Nomad,
            "fixed" => match (buy_price, sell_price) {
                (Some(buy_price), Some(sell_price)) => ProviderKind::Fixed {
                    buy_price,
                    sell_price,
                },
                _ => bail!("Source 'fixed' requires buy_price and sell_price"),
            },
            other => bail!("Unknown quote source: {}", other),
        };
        Ok(kind)
    }

    /// Build the provider implementation for this kind
    pub fn build(self, settings: &SimulationSettings) -> Arc<dyn QuoteProvider> {
        match self {
            ProviderKind::Ambito => Arc::new(SimulatedProvider::new(
                "ambito", 1180.0, 1220.0, 30.0, settings,
            )),
            ProviderKind::DolarHoy => Arc::new(SimulatedProvider::new(
                "dolarhoy", 1175.0, 1215.0, 25.0, settings,
            )),
            ProviderKind::Cronista => Arc::new(SimulatedProvider::new(
                "cronista", 1170.0, 1225.0, 35.0, settings,
            )),
            ProviderKind::Wise => Arc::new(SimulatedProvider::new(
                "wise", 5.10, 5.30, 0.06, settings,
            )),
            ProviderKind::Nubank => Arc::new(SimulatedProvider::new(
                "nubank", 5.15, 5.35, 0.10, settings,
            )),
            ProviderKind::Nomad => Arc::new(SimulatedProvider::new(
                "nomad", 5.12, 5.32, 0.08, settings,
            )),
            ProviderKind::Fixed {
                buy_price,
                sell_price,
            } => Arc::new(FixedProvider::new(PricePair::new(buy_price, sell_price))),
        }
    }
}

/// Fetch from a registered source, absorbing every failure.
///
/// Errors and timeouts are logged and replaced with [`PricePair::SENTINEL`].
pub async fn fetch_or_sentinel(
    source: &RegisteredSource,
    currency: &Currency,
    timeout: Duration,
) -> PricePair {
    match tokio::time::timeout(timeout, source.provider.fetch(currency)).await {
        Ok(Ok(pair)) => {
            tracing::debug!(
                currency = %currency,
                source = %source.descriptor.name,
                buy = pair.buy_price,
                sell = pair.sell_price,
                "Got quote from source"
            );
            pair
        }
        Ok(Err(e)) => {
            tracing::warn!(
                currency = %currency,
                source = %source.descriptor.name,
                error = %e,
                "Source failed, using zero sentinel"
            );
            PricePair::SENTINEL
        }
        Err(_) => {
            tracing::warn!(
                currency = %currency,
                source = %source.descriptor.name,
                timeout_ms = timeout.as_millis() as u64,
                "Source timed out, using zero sentinel"
            );
            PricePair::SENTINEL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::registry::SourceDescriptor;

    fn registered(provider: Arc<dyn QuoteProvider>) -> RegisteredSource {
        RegisteredSource {
            descriptor: SourceDescriptor::new("test", "https://example.com"),
            provider,
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl QuoteProvider for SlowProvider {
        async fn fetch(&self, _currency: &Currency) -> Result<PricePair> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(PricePair::new(1.0, 2.0))
        }
    }

    #[test]
    fn test_from_name_resolves_known_sources() {
        assert_eq!(ProviderKind::from_name("Wise", None, None).unwrap(), ProviderKind::Wise);
        assert_eq!(
            ProviderKind::from_name("fixed", Some(5.2), Some(5.3)).unwrap(),
            ProviderKind::Fixed {
                buy_price: 5.2,
                sell_price: 5.3
            }
        );
        assert!(ProviderKind::from_name("fixed", Some(5.2), None).is_err());
        assert!(ProviderKind::from_name("bloomberg", None, None).is_err());
    }

    #[tokio::test]
    async fn test_provider_error_becomes_sentinel() {
        let mut mock = MockQuoteProvider::new();
        mock.expect_fetch()
            .returning(|_| Err(anyhow::anyhow!("upstream exploded")));

        let pair = fetch_or_sentinel(
            &registered(Arc::new(mock)),
            &Currency::brl(),
            Duration::from_secs(1),
        )
        .await;

        assert!(pair.is_sentinel());
    }

    #[tokio::test]
    async fn test_provider_timeout_becomes_sentinel() {
        let pair = fetch_or_sentinel(
            &registered(Arc::new(SlowProvider)),
            &Currency::brl(),
            Duration::from_millis(20),
        )
        .await;

        assert!(pair.is_sentinel());
    }

    #[tokio::test]
    async fn test_successful_fetch_passes_through() {
        let mut mock = MockQuoteProvider::new();
        mock.expect_fetch()
            .returning(|_| Ok(PricePair::new(5.2, 5.3)));

        let pair = fetch_or_sentinel(
            &registered(Arc::new(mock)),
            &Currency::brl(),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(pair, PricePair::new(5.2, 5.3));
    }
}
