//! QuoteHub - currency quote aggregator
//!
//! Usage: cargo run --bin quotehub
//!
//! Configuration comes from config/default, config/local and QUOTEHUB__* env vars.

use anyhow::Context;
use quotehub::config::AppConfig;
use quotehub::logging::init_logging;
use quotehub::oracle::{QuoteAggregator, QuoteCache, QuoteService, SourceRegistry};
use quotehub::persistence;
use quotehub::server::{self, create_router, AppState};
use quotehub::types::Currency;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Config + logging
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;
    info!("🚀 QuoteHub starting");
    info!("{}", config.digest());

    // 2. Sources
    let registry = Arc::new(SourceRegistry::from_config(&config)?);
    let currencies: Vec<String> = registry
        .currencies()
        .iter()
        .map(|c| c.to_string())
        .collect();
    info!(currencies = ?currencies, "Quote sources registered");

    let default_currency = Currency::new(config.server.default_currency.as_str());
    if !registry.supports(&default_currency) {
        warn!(currency = %default_currency, "Default currency has no registered sources");
    }

    // 3. Persistence
    let (sink, worker) = persistence::start(&config.persistence)?;

    // 4. Service
    let aggregator = QuoteAggregator::new(registry, sink.clone(), config.providers.timeout());
    let cache = QuoteCache::new(config.cache.freshness());
    let service = Arc::new(QuoteService::new(aggregator, cache, sink));

    // 5. HTTP API
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid server address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let app = create_router(AppState::new(service, default_currency));
    let result = server::serve(app, addr, server::shutdown_signal()).await;

    // 6. Drain pending writes on every exit path
    if let Some(worker) = worker {
        worker.shutdown().await;
    }

    info!("👋 QuoteHub stopped");
    result
}
