//! REST response types and errors

use crate::orderbook::PriceLevel;
use serde::Deserialize;
use thiserror::Error;

/// Body of `GET /markets/{ticker}/orderbook`
#[derive(Debug, Deserialize)]
pub(crate) struct OrderbookResponse {
    pub orderbook: OrderbookBody,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrderbookBody {
    // empty sides come back as null
    #[serde(default)]
    pub yes: Option<Vec<PriceLevel>>,
    #[serde(default)]
    pub no: Option<Vec<PriceLevel>>,
}

/// REST polling errors
#[derive(Debug, Error)]
pub enum RestError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// Body was not a valid order book
    #[error("Failed to decode order book: {0}")]
    Decode(#[from] serde_json::Error),
}
