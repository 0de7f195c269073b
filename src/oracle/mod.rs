//! Oracle module - Multi-source quote aggregation
//!
//! Collects buy/sell quotes from every source registered for a currency,
//! derives the cross-source average and per-source slippage, and keeps the
//! result in a short-lived cache.

mod aggregator;
mod cache;
pub mod registry;
mod service;
pub mod sources;
pub mod statistics;

pub use aggregator::QuoteAggregator;
pub use cache::{CacheEntry, QuoteCache};
pub use registry::{RegisteredSource, SourceDescriptor, SourceRegistry};
pub use service::QuoteService;
pub use sources::{fetch_or_sentinel, QuoteProvider};
