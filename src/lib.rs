//! QuoteHub Library
//!
//! Multi-source currency quote aggregation with average and slippage views

pub mod config;
pub mod error;
pub mod logging;
pub mod oracle;
pub mod persistence;
pub mod server;
pub mod types;
