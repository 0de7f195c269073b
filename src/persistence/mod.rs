//! CSV Persistence Module
//!
//! Append-only quote log plus a best-effort, one-file-per-currency mirror of
//! the cache. Nothing here is ever read back by the quote pipeline.

mod worker;

pub use worker::{PersistenceWorker, QuoteSink, SinkRecord};

use anyhow::{Context, Result};
use chrono::Utc;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock as AsyncRwLock;
use tracing::info;

use crate::config::PersistenceConfig;
use crate::oracle::CacheEntry;
use crate::types::{AveragePair, Currency, Quote, SlippageEntry};

/// One provider call, as logged to `quotes/quotes_YYYY-MM-DD.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedQuoteRecord {
    pub timestamp: i64,
    pub currency: String,
    pub source: String,
    pub buy_price: f64,
    pub sell_price: f64,
}

impl PersistedQuoteRecord {
    pub fn new(currency: &Currency, quote: &Quote) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            currency: currency.code().to_string(),
            source: quote.source.clone(),
            buy_price: quote.buy_price,
            sell_price: quote.sell_price,
        }
    }
}

/// Snapshot of one cache entry, written to `cache/cache_<CUR>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMirrorRecord {
    pub currency: String,
    pub created_at: i64,
    pub quotes: Vec<Quote>,
    pub average: AveragePair,
    pub slippage: Vec<SlippageEntry>,
}

impl From<&CacheEntry> for CacheMirrorRecord {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            currency: entry.currency.code().to_string(),
            created_at: entry.created_at.timestamp_millis(),
            quotes: entry.bundle.quotes.clone(),
            average: entry.bundle.average,
            slippage: entry.bundle.slippage.clone(),
        }
    }
}

struct DatedWriter {
    date: String,
    writer: csv::Writer<fs::File>,
}

/// CSV persistence manager
pub struct CsvPersistence {
    data_dir: PathBuf,
    quote_writer: AsyncRwLock<DatedWriter>,
}

impl CsvPersistence {
    /// Create a new CSV persistence manager
    pub fn new(data_dir: &str) -> Result<Self> {
        let data_dir = PathBuf::from(data_dir);

        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
        fs::create_dir_all(data_dir.join("quotes"))?;
        fs::create_dir_all(data_dir.join("cache"))?;

        let today = Self::today();
        let writer = Self::create_writer(&data_dir.join("quotes"), &Self::quote_file(&today))?;

        info!(data_dir = %data_dir.display(), "Persistence opened");

        Ok(Self {
            data_dir,
            quote_writer: AsyncRwLock::new(DatedWriter {
                date: today,
                writer,
            }),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn today() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    fn quote_file(date: &str) -> String {
        format!("quotes_{}.csv", date)
    }

    fn create_writer(dir: &Path, filename: &str) -> Result<csv::Writer<fs::File>> {
        let path = dir.join(filename);
        let file_has_data =
            path.exists() && fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open CSV file")?;

        let writer = WriterBuilder::new()
            .has_headers(!file_has_data)
            .from_writer(file);

        Ok(writer)
    }

    /// Append a quote row, rotating to a new file when the UTC date changes
    pub async fn save_quote(&self, record: &PersistedQuoteRecord) -> Result<()> {
        let mut current = self.quote_writer.write().await;

        let today = Self::today();
        if current.date != today {
            current.writer.flush().context("Failed to flush quote writer")?;
            let writer =
                Self::create_writer(&self.data_dir.join("quotes"), &Self::quote_file(&today))?;
            *current = DatedWriter {
                date: today,
                writer,
            };
        }

        current
            .writer
            .serialize(record)
            .context("Failed to write quote record")?;
        current.writer.flush().context("Failed to flush quote writer")?;
        Ok(())
    }

    /// Replace the mirror file for one currency
    pub async fn save_cache_mirror(&self, record: &CacheMirrorRecord) -> Result<()> {
        let dir = self.data_dir.join("cache");
        let path = dir.join(format!("cache_{}.json", record.currency));
        let tmp = dir.join(format!("cache_{}.json.tmp", record.currency));

        let json = serde_json::to_vec_pretty(record).context("Failed to encode cache mirror")?;
        fs::write(&tmp, json).context("Failed to write cache mirror")?;
        fs::rename(&tmp, &path).context("Failed to replace cache mirror")?;
        Ok(())
    }

    pub async fn flush(&self) -> Result<()> {
        let mut current = self.quote_writer.write().await;
        current.writer.flush().context("Failed to flush quote writer")?;
        Ok(())
    }
}

/// Open persistence and start its writer task.
///
/// When disabled, the returned sink drops every record and there is no worker.
pub fn start(config: &PersistenceConfig) -> Result<(QuoteSink, Option<PersistenceWorker>)> {
    if !config.enabled {
        info!("Persistence disabled");
        return Ok((QuoteSink::disabled(), None));
    }

    let persistence = CsvPersistence::new(&config.data_dir)?;
    let (sink, worker) = PersistenceWorker::spawn(persistence, config.channel_capacity);
    Ok((sink, Some(worker)))
}
