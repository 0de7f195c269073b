//! Background writer fed by a bounded channel.
//!
//! Request handlers never wait on disk: they `try_send` into the channel and
//! move on. A full or closed channel drops the record with a log line.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{CacheMirrorRecord, CsvPersistence, PersistedQuoteRecord};
use crate::oracle::CacheEntry;
use crate::types::{Currency, Quote};

/// Record handed to the writer task
#[derive(Debug, Clone, PartialEq)]
pub enum SinkRecord {
    Quote(PersistedQuoteRecord),
    CacheMirror(CacheMirrorRecord),
}

/// Fire-and-forget handle to the persistence worker
#[derive(Debug, Clone, Default)]
pub struct QuoteSink {
    tx: Option<mpsc::Sender<SinkRecord>>,
}

impl QuoteSink {
    /// Sink that drops everything
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn from_sender(tx: mpsc::Sender<SinkRecord>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn record_quote(&self, currency: &Currency, quote: &Quote) {
        self.send(SinkRecord::Quote(PersistedQuoteRecord::new(currency, quote)));
    }

    pub fn mirror_cache(&self, entry: &CacheEntry) {
        self.send(SinkRecord::CacheMirror(CacheMirrorRecord::from(entry)));
    }

    fn send(&self, record: SinkRecord) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(record) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Persistence queue full, dropping record");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Persistence worker stopped, dropping record");
            }
        }
    }
}

/// Owns the writer task; call [`PersistenceWorker::shutdown`] before exit
pub struct PersistenceWorker {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl PersistenceWorker {
    pub fn spawn(persistence: CsvPersistence, capacity: usize) -> (QuoteSink, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run(persistence, rx, shutdown_rx));

        (
            QuoteSink::from_sender(tx),
            Self {
                shutdown_tx,
                handle,
            },
        )
    }

    /// Drain queued records, flush and close the files
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Persistence worker ended abnormally");
        }
    }
}

async fn run(
    persistence: CsvPersistence,
    mut rx: mpsc::Receiver<SinkRecord>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            record = rx.recv() => match record {
                Some(record) => write(&persistence, record).await,
                None => break,
            },
            _ = &mut shutdown_rx => {
                rx.close();
                while let Some(record) = rx.recv().await {
                    write(&persistence, record).await;
                }
                break;
            }
        }
    }

    if let Err(e) = persistence.flush().await {
        warn!(error = %e, "Failed to flush persistence on shutdown");
    }
    info!(data_dir = %persistence.data_dir().display(), "Persistence closed");
}

async fn write(persistence: &CsvPersistence, record: SinkRecord) {
    let result = match &record {
        SinkRecord::Quote(quote) => persistence.save_quote(quote).await,
        SinkRecord::CacheMirror(mirror) => persistence.save_cache_mirror(mirror).await,
    };
    if let Err(e) = result {
        warn!(error = %e, "Failed to persist record");
    }
}
