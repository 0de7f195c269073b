//! Errors that cross from the quote pipeline into the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::types::{Currency, Side};

/// Errors that can occur while serving quotes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuoteError {
    /// No providers are registered for the currency.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(Currency),

    /// An average was requested over zero quotes.
    #[error("Cannot compute average of an empty quote set")]
    EmptyQuoteSet,

    /// An average component is zero, so slippage would divide by zero.
    #[error("Average {side} price is zero; slippage is undefined")]
    DegenerateAverage { side: Side },
}

/// Result type for quote operations.
pub type QuoteResult<T> = Result<T, QuoteError>;

/// JSON body returned for any failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Request failed");
        let body = ErrorBody {
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
