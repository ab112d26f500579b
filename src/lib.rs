//! kalshi-book: Streaming order book reconciliation for Kalshi binary markets
//!
//! This library provides the core components for:
//! - Price-level books and two-sided snapshots
//! - Execution pricing against the opposite side's bids
//! - Reconciling the `orderbook_delta` WebSocket channel into books
//! - REST polling for cross-checking the streamed book
//! - Full observability stack

pub mod cli;
pub mod config;
pub mod feed;
pub mod orderbook;
pub mod rest;
pub mod telemetry;
pub mod ws;
