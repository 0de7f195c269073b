//! Per-currency bundle cache with a short freshness window.
//!
//! The window is meant to absorb bursts of near-simultaneous requests, not
//! to cache for long. Entries are replaced whole and never removed; the
//! keyspace is bounded by the registered currencies.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{Currency, QuoteBundle};

/// Cached bundle for one currency
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub currency: Currency,
    pub bundle: QuoteBundle,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now.signed_duration_since(self.created_at) < window
    }
}

pub struct QuoteCache {
    entries: RwLock<HashMap<Currency, CacheEntry>>,
    freshness: Duration,
}

impl QuoteCache {
    pub fn new(freshness: std::time::Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            freshness: Duration::from_std(freshness).unwrap_or_else(|_| Duration::days(365)),
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Fresh entry for `currency`, or `None` on miss or expiry
    pub async fn get(&self, currency: &Currency) -> Option<CacheEntry> {
        let entries = self.entries.read().await;
        match entries.get(currency) {
            Some(entry) if entry.is_fresh_at(Utc::now(), self.freshness) => {
                debug!(currency = %currency, "Cache hit");
                Some(entry.clone())
            }
            Some(_) => {
                debug!(currency = %currency, "Cache entry expired");
                None
            }
            None => {
                debug!(currency = %currency, "Cache miss");
                None
            }
        }
    }

    /// Replace the entry for `currency` with a freshly stamped one
    pub async fn put(&self, currency: Currency, bundle: QuoteBundle) -> CacheEntry {
        let entry = CacheEntry {
            currency: currency.clone(),
            bundle,
            created_at: Utc::now(),
        };
        self.entries.write().await.insert(currency, entry.clone());
        entry
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
