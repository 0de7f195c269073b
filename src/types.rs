//! Core types used throughout QuoteHub
//!
//! Defines currencies, quotes and the statistics derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency code, always stored upper-case (e.g. "ARS", "BRL")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Create a currency from a code, normalizing case and whitespace
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Argentine peso
    pub fn ars() -> Self {
        Self::new("ARS")
    }

    /// Brazilian real
    pub fn brl() -> Self {
        Self::new("BRL")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Buy/sell pair as returned by a quote provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePair {
    pub buy_price: f64,
    pub sell_price: f64,
}

impl PricePair {
    /// Substituted when a provider fails, so the source stays in the aggregate
    pub const SENTINEL: PricePair = PricePair {
        buy_price: 0.0,
        sell_price: 0.0,
    };

    pub fn new(buy_price: f64, sell_price: f64) -> Self {
        Self {
            buy_price,
            sell_price,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

/// One source's quote for one currency at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub buy_price: f64,
    pub sell_price: f64,
    pub source: String,
}

impl Quote {
    pub fn new(pair: PricePair, source: impl Into<String>) -> Self {
        Self {
            buy_price: pair.buy_price,
            sell_price: pair.sell_price,
            source: source.into(),
        }
    }
}

/// Arithmetic mean of a batch of quotes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragePair {
    pub average_buy_price: f64,
    pub average_sell_price: f64,
}

/// Percentage deviation of one quote from the average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlippageEntry {
    pub buy_price_slippage: f64,
    pub sell_price_slippage: f64,
    pub source: String,
}

/// Everything computed from one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBundle {
    pub quotes: Vec<Quote>,
    pub average: AveragePair,
    pub slippage: Vec<SlippageEntry>,
}

/// Price side, used in error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}
