//! Streaming order book client
//!
//! Drives a [`FeedReconciler`] from a [`FeedTransport`] and forwards every
//! accepted book to a bounded channel.

use super::reconciler::FeedReconciler;
use super::types::FeedError;
use crate::orderbook::DualSideBook;
use crate::ws::{WsClient, WsConfig, WsConnection, WsMessage};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Kalshi trade API WebSocket URL
pub const KALSHI_WS_URL: &str = "wss://trading-api.kalshi.com/trade-api/ws/v2";

/// Id of the subscribe command; a session sends exactly one
pub const SUBSCRIBE_COMMAND_ID: u64 = 1;

/// Source of raw feed messages for one subscription
#[async_trait]
pub trait FeedTransport: Send {
    /// Send a command to the server
    async fn send_text(&mut self, text: String) -> Result<(), FeedError>;
    /// Next text message; `None` once the server has ended the stream
    async fn next_text(&mut self) -> Result<Option<String>, FeedError>;
}

#[async_trait]
impl FeedTransport for WsConnection {
    async fn send_text(&mut self, text: String) -> Result<(), FeedError> {
        self.send(text).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Result<Option<String>, FeedError> {
        loop {
            match self.recv().await {
                Some(WsMessage::Text(text)) => return Ok(Some(text)),
                Some(WsMessage::Binary(data)) => {
                    tracing::trace!(len = data.len(), "Ignoring binary frame");
                }
                Some(WsMessage::Disconnected) | None => return Ok(None),
                Some(WsMessage::Failed(e)) => return Err(e.into()),
            }
        }
    }
}

/// How a feed session ended without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEnd {
    /// Shutdown was signalled
    Shutdown,
    /// Server ended the stream
    EndOfStream,
    /// The book receiver was dropped
    ConsumerGone,
}

/// Run one order book subscription to completion.
///
/// Sends the subscribe command, then feeds every message through a fresh
/// [`FeedReconciler`] and sends each resulting book on `books`. Faults are
/// returned as errors; no book is sent after a fault or after `shutdown`
/// flips to `true`.
pub async fn run_book_feed<T>(
    transport: &mut T,
    market_ticker: &str,
    books: &mpsc::Sender<DualSideBook>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<FeedEnd, FeedError>
where
    T: FeedTransport + ?Sized,
{
    let mut reconciler = FeedReconciler::new(market_ticker, SUBSCRIBE_COMMAND_ID);

    let command = serde_json::to_string(&reconciler.subscribe_command())?;
    transport.send_text(command).await?;
    tracing::info!(market = %market_ticker, "Sent order book subscription");

    loop {
        let next = tokio::select! {
            biased;
            _ = cancelled(&mut shutdown) => {
                reconciler.close();
                return Ok(FeedEnd::Shutdown);
            }
            next = transport.next_text() => next,
        };

        let text = match next {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::info!(market = %market_ticker, "Order book stream ended");
                reconciler.close();
                return Ok(FeedEnd::EndOfStream);
            }
            Err(e) => {
                reconciler.close();
                return Err(e);
            }
        };

        let Some(book) = reconciler.handle(&text)? else {
            continue;
        };

        tokio::select! {
            biased;
            _ = cancelled(&mut shutdown) => {
                reconciler.close();
                return Ok(FeedEnd::Shutdown);
            }
            sent = books.send(book) => {
                if sent.is_err() {
                    tracing::debug!(market = %market_ticker, "Book receiver dropped");
                    reconciler.close();
                    return Ok(FeedEnd::ConsumerGone);
                }
            }
        }
    }
}

/// Resolves once `shutdown` holds `true`; never resolves if the sender is gone
pub(crate) async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Configuration for the streaming client
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// WebSocket URL (defaults to KALSHI_WS_URL)
    pub ws_url: String,
    /// Extra handshake headers supplied by the caller's auth layer
    pub headers: Vec<(String, String)>,
    /// Handshake timeout
    pub connect_timeout: Duration,
    /// Keepalive ping interval
    pub ping_interval: Duration,
    /// Time allowed for a pong reply
    pub pong_timeout: Duration,
    /// Books buffered for the consumer
    pub buffer_size: usize,
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self {
            ws_url: KALSHI_WS_URL.to_string(),
            headers: Vec::new(),
            connect_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(10),
            pong_timeout: Duration::from_secs(10),
            buffer_size: 1,
        }
    }
}

/// A running subscription
pub struct BookSubscription {
    /// Books, one per accepted message
    pub books: mpsc::Receiver<DualSideBook>,
    /// Resolves when the session ends
    pub task: JoinHandle<Result<FeedEnd, FeedError>>,
}

/// Streaming order book client
pub struct FeedClient {
    config: FeedClientConfig,
}

impl FeedClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self {
            config: FeedClientConfig::default(),
        }
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: FeedClientConfig) -> Self {
        Self { config }
    }

    /// Connect and subscribe to one market's order book.
    ///
    /// Each call opens its own connection; the session ends on the first
    /// fault and is not resumed.
    pub async fn subscribe(
        &self,
        market_ticker: &str,
        shutdown: watch::Receiver<bool>,
    ) -> Result<BookSubscription, FeedError> {
        let mut ws_config = WsConfig::new(&self.config.ws_url)
            .connect_timeout(self.config.connect_timeout)
            .ping_interval(self.config.ping_interval)
            .pong_timeout(self.config.pong_timeout);
        for (name, value) in &self.config.headers {
            ws_config = ws_config.header(name, value);
        }

        let mut connection = WsClient::new(ws_config).connect().await?;
        let (tx, rx) = mpsc::channel(self.config.buffer_size.max(1));
        let ticker = market_ticker.to_string();

        let task = tokio::spawn(async move {
            let result = run_book_feed(&mut connection, &ticker, &tx, shutdown).await;
            connection.close().await;
            result
        });

        tracing::info!(market = %market_ticker, "Started order book subscription");

        Ok(BookSubscription { books: rx, task })
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}
