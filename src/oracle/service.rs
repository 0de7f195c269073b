//! Response assembly: decides between fresh and cached data for each view.
//!
//! `quotes` always hits the sources. `average` and `slippage` go through the
//! cache. Concurrent misses for the same currency are not coalesced; each one
//! recomputes and the last write wins.

use tracing::{debug, instrument};

use crate::error::QuoteResult;
use crate::oracle::aggregator::QuoteAggregator;
use crate::oracle::cache::QuoteCache;
use crate::oracle::statistics;
use crate::persistence::QuoteSink;
use crate::types::{AveragePair, Currency, Quote, QuoteBundle, SlippageEntry};

pub struct QuoteService {
    aggregator: QuoteAggregator,
    cache: QuoteCache,
    sink: QuoteSink,
}

impl QuoteService {
    pub fn new(aggregator: QuoteAggregator, cache: QuoteCache, sink: QuoteSink) -> Self {
        Self {
            aggregator,
            cache,
            sink,
        }
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    pub fn supported_currencies(&self) -> Vec<Currency> {
        self.aggregator.registry().currencies()
    }

    /// Fresh quotes from every source, bypassing the cache
    pub async fn quotes(&self, currency: &Currency) -> QuoteResult<Vec<Quote>> {
        self.aggregator.aggregate(currency).await
    }

    pub async fn average(&self, currency: &Currency) -> QuoteResult<AveragePair> {
        Ok(self.bundle(currency).await?.average)
    }

    pub async fn slippage(&self, currency: &Currency) -> QuoteResult<Vec<SlippageEntry>> {
        Ok(self.bundle(currency).await?.slippage)
    }

    #[instrument(skip(self, currency), fields(currency = %currency))]
    async fn bundle(&self, currency: &Currency) -> QuoteResult<QuoteBundle> {
        // Never serve a cached entry for a currency the registry no longer knows
        self.aggregator.registry().providers_for(currency)?;

        if let Some(entry) = self.cache.get(currency).await {
            return Ok(entry.bundle);
        }

        let quotes = self.aggregator.aggregate(currency).await?;
        let average = statistics::average(&quotes)?;
        let slippage = statistics::slippage(&quotes, &average)?;
        let bundle = QuoteBundle {
            quotes,
            average,
            slippage,
        };

        let entry = self.cache.put(currency.clone(), bundle.clone()).await;
        self.sink.mirror_cache(&entry);
        debug!("Refreshed cached bundle");

        Ok(bundle)
    }
}
