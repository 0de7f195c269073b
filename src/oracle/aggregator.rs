//! Quote Aggregator - Collects one quote per registered source
//!
//! Sources are awaited one after another in registry order, which keeps the
//! load on each upstream bounded and the output order reproducible.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::QuoteResult;
use crate::oracle::registry::SourceRegistry;
use crate::oracle::sources::fetch_or_sentinel;
use crate::persistence::QuoteSink;
use crate::types::{Currency, Quote};

pub struct QuoteAggregator {
    registry: Arc<SourceRegistry>,
    sink: QuoteSink,
    provider_timeout: Duration,
}

impl QuoteAggregator {
    pub fn new(registry: Arc<SourceRegistry>, sink: QuoteSink, provider_timeout: Duration) -> Self {
        Self {
            registry,
            sink,
            provider_timeout,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// One quote per source for `currency`, in registry order.
    ///
    /// Only fails when the currency is not registered; source failures show
    /// up as zero-valued quotes.
    #[instrument(skip(self, currency), fields(currency = %currency))]
    pub async fn aggregate(&self, currency: &Currency) -> QuoteResult<Vec<Quote>> {
        let sources = self.registry.providers_for(currency)?;
        let mut quotes = Vec::with_capacity(sources.len());

        for source in sources {
            let pair = fetch_or_sentinel(source, currency, self.provider_timeout).await;
            let quote = Quote::new(pair, source.descriptor.identifier.as_str());
            self.sink.record_quote(currency, &quote);
            quotes.push(quote);
        }

        debug!(count = quotes.len(), "Aggregated quotes");
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuoteError;
    use crate::oracle::registry::SourceDescriptor;
    use crate::oracle::sources::MockQuoteProvider;
    use crate::persistence::SinkRecord;
    use crate::types::PricePair;
    use tokio::sync::mpsc;

    fn mock_returning(pair: PricePair) -> Arc<MockQuoteProvider> {
        let mut mock = MockQuoteProvider::new();
        mock.expect_fetch().times(1).returning(move |_| Ok(pair));
        Arc::new(mock)
    }

    fn failing_mock() -> Arc<MockQuoteProvider> {
        let mut mock = MockQuoteProvider::new();
        mock.expect_fetch()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("page layout changed")));
        Arc::new(mock)
    }

    fn ars_registry() -> Arc<SourceRegistry> {
        Arc::new(
            SourceRegistry::builder()
                .register(
                    Currency::ars(),
                    SourceDescriptor::new("ambito", "ambito-url"),
                    mock_returning(PricePair::new(900.0, 920.0)),
                )
                .register(
                    Currency::ars(),
                    SourceDescriptor::new("dolarhoy", "dolarhoy-url"),
                    failing_mock(),
                )
                .register(
                    Currency::ars(),
                    SourceDescriptor::new("cronista", "cronista-url"),
                    mock_returning(PricePair::new(920.0, 930.0)),
                )
                .build(),
        )
    }

    #[tokio::test]
    async fn test_aggregate_keeps_registry_order_and_sentinels() {
        let aggregator = QuoteAggregator::new(
            ars_registry(),
            QuoteSink::disabled(),
            Duration::from_secs(1),
        );

        let quotes = aggregator.aggregate(&Currency::ars()).await.unwrap();

        let sources: Vec<&str> = quotes.iter().map(|q| q.source.as_str()).collect();
        assert_eq!(sources, vec!["ambito-url", "dolarhoy-url", "cronista-url"]);
        assert_eq!(quotes[0].buy_price, 900.0);
        assert_eq!(quotes[1].buy_price, 0.0);
        assert_eq!(quotes[1].sell_price, 0.0);
        assert_eq!(quotes[2].sell_price, 930.0);
    }

    #[tokio::test]
    async fn test_aggregate_hands_every_quote_to_sink() {
        let (tx, mut rx) = mpsc::channel(16);
        let aggregator = QuoteAggregator::new(
            ars_registry(),
            QuoteSink::from_sender(tx),
            Duration::from_secs(1),
        );

        aggregator.aggregate(&Currency::ars()).await.unwrap();

        let mut recorded = Vec::new();
        while let Ok(record) = rx.try_recv() {
            match record {
                SinkRecord::Quote(q) => recorded.push((q.currency, q.source)),
                other => panic!("unexpected record {:?}", other),
            }
        }
        assert_eq!(
            recorded,
            vec![
                ("ARS".to_string(), "ambito-url".to_string()),
                ("ARS".to_string(), "dolarhoy-url".to_string()),
                ("ARS".to_string(), "cronista-url".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_aggregate_survives_closed_sink() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let aggregator = QuoteAggregator::new(
            ars_registry(),
            QuoteSink::from_sender(tx),
            Duration::from_secs(1),
        );

        assert_eq!(aggregator.aggregate(&Currency::ars()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_aggregate_unsupported_currency() {
        let aggregator = QuoteAggregator::new(
            Arc::new(SourceRegistry::default()),
            QuoteSink::disabled(),
            Duration::from_secs(1),
        );

        let err = aggregator.aggregate(&Currency::new("XYZ")).await.unwrap_err();
        assert_eq!(err, QuoteError::UnsupportedCurrency(Currency::new("XYZ")));
    }
}
