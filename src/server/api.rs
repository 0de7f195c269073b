//! Quote HTTP API
//!
//! JSON endpoints consumed by the dashboard.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::error::QuoteError;
use crate::oracle::QuoteService;
use crate::types::{AveragePair, Currency, Quote, SlippageEntry};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QuoteService>,
    /// Used when a request carries no `currency`
    pub default_currency: Currency,
}

impl AppState {
    pub fn new(service: Arc<QuoteService>, default_currency: Currency) -> Self {
        Self {
            service,
            default_currency,
        }
    }

    fn currency_for(&self, query: &CurrencyQuery) -> Currency {
        match query.currency.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Currency::new(code),
            _ => self.default_currency.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CurrencyQuery {
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/welcome", get(get_welcome))
        .route("/quotes", get(get_quotes))
        .route("/average", get(get_average))
        .route("/slippage", get(get_slippage))
        .with_state(state)
        // CORS for the dashboard
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

// ─────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────

/// GET /welcome
async fn get_welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to QuoteHub! Try /quotes, /average or /slippage with ?currency=ARS|BRL"
            .to_string(),
    })
}

/// GET /quotes?currency=BRL - fresh quotes from every source
async fn get_quotes(
    State(state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<Json<Vec<Quote>>, QuoteError> {
    let currency = state.currency_for(&query);
    let quotes = state.service.quotes(&currency).await?;
    Ok(Json(quotes))
}

/// GET /average?currency=BRL - cross-source average, cached briefly
async fn get_average(
    State(state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<Json<AveragePair>, QuoteError> {
    let currency = state.currency_for(&query);
    let average = state.service.average(&currency).await?;
    Ok(Json(average))
}

/// GET /slippage?currency=BRL - per-source deviation from the average
async fn get_slippage(
    State(state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<Json<Vec<SlippageEntry>>, QuoteError> {
    let currency = state.currency_for(&query);
    let slippage = state.service.slippage(&currency).await?;
    Ok(Json(slippage))
}
