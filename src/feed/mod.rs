//! Order book feed module
//!
//! Streams one market's order book from the `orderbook_delta` WebSocket
//! channel and reconciles it into [`DualSideBook`] snapshots.
//!
//! [`DualSideBook`]: crate::orderbook::DualSideBook

mod client;
mod reconciler;
mod types;

pub use client::{
    run_book_feed, BookSubscription, FeedClient, FeedClientConfig, FeedEnd, FeedTransport,
    KALSHI_WS_URL, SUBSCRIBE_COMMAND_ID,
};
pub(crate) use client::cancelled;
pub use reconciler::{FeedReconciler, FeedState};
pub use types::{CommandParams, FeedError, SubscribeCommand, ORDERBOOK_CHANNEL};
