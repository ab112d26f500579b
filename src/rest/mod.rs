//! REST order book polling

mod client;
mod types;

pub use client::{BookFetcher, RestClient, RestConfig, KALSHI_REST_URL};
pub use types::RestError;
