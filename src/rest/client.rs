//! Order book polling over the trade REST API
//!
//! Used to cross-check the streamed book against the exchange's view.

use super::types::{OrderbookResponse, RestError};
use crate::orderbook::{DualSideBook, PriceLevelBook};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Kalshi trade API REST base URL
pub const KALSHI_REST_URL: &str = "https://trading-api.kalshi.com/trade-api/v2";

/// Anything that can produce a point-in-time order book
#[async_trait]
pub trait BookFetcher: Send + Sync {
    /// Fetch the current book for a market
    async fn fetch_book(&self, market_ticker: &str) -> Result<DualSideBook, RestError>;
}

/// Configuration for the REST client
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL (defaults to KALSHI_REST_URL)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: KALSHI_REST_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// REST client for order book snapshots
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// Create a client against the production API
    pub fn new() -> Result<Self, RestError> {
        Self::with_config(RestConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: RestConfig) -> Result<Self, RestError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the current order book.
    ///
    /// Endpoint: GET /markets/{ticker}/orderbook
    pub async fn fetch_book(&self, market_ticker: &str) -> Result<DualSideBook, RestError> {
        let url = format!("{}/markets/{}/orderbook", self.base_url, market_ticker);
        tracing::debug!(%url, "Fetching order book");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: OrderbookResponse = serde_json::from_slice(&body)?;

        let yes: PriceLevelBook = parsed.orderbook.yes.unwrap_or_default().into();
        let no: PriceLevelBook = parsed.orderbook.no.unwrap_or_default().into();

        tracing::debug!(
            market = %market_ticker,
            yes_levels = yes.len(),
            no_levels = no.len(),
            "Fetched order book"
        );

        Ok(DualSideBook::from_sides(market_ticker, yes, no))
    }
}

#[async_trait]
impl BookFetcher for RestClient {
    async fn fetch_book(&self, market_ticker: &str) -> Result<DualSideBook, RestError> {
        RestClient::fetch_book(self, market_ticker).await
    }
}
