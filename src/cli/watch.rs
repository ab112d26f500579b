//! Watch command implementation

use super::{shutdown_on_ctrl_c, summarize};
use crate::config::{Config, FeedConfig};
use crate::feed::{cancelled, FeedClient, FeedEnd};
use clap::Args;
use std::time::Duration;
use tokio::time::sleep;

/// Floor for the resubscription delay
const MIN_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Market ticker
    pub ticker: String,

    /// Contracts to price on each side
    #[arg(short, long, default_value_t = 100)]
    pub quantity: i64,

    /// Print every book as a JSON line
    #[arg(long)]
    pub json: bool,
}

impl WatchArgs {
    /// Stream until Ctrl-C, subscribing again after every fault
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if self.quantity <= 0 {
            anyhow::bail!("Quantity must be positive, got {}", self.quantity);
        }

        let (_signal, mut shutdown) = shutdown_on_ctrl_c();
        let client = FeedClient::with_config(config.feed_client());

        let (initial_delay, max_delay) = backoff_bounds(&config.feed);
        let mut delay = initial_delay;
        let mut attempts: u32 = 0;

        loop {
            let outcome = match client.subscribe(&self.ticker, shutdown.clone()).await {
                Ok(mut subscription) => {
                    let mut received = 0u64;
                    while let Some(book) = subscription.books.recv().await {
                        received += 1;
                        self.print(&book)?;
                    }
                    if received > 0 {
                        // a session that got anywhere resets the backoff
                        delay = initial_delay;
                        attempts = 0;
                    }
                    subscription
                        .task
                        .await
                        .map_err(|e| anyhow::anyhow!("Feed task panicked: {}", e))?
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(FeedEnd::Shutdown) | Ok(FeedEnd::ConsumerGone) => break,
                Ok(FeedEnd::EndOfStream) => {
                    tracing::warn!(market = %self.ticker, "Server ended the stream");
                }
                Err(e) => {
                    tracing::warn!(
                        market = %self.ticker,
                        error = %e,
                        kind = e.kind(),
                        "Order book session failed"
                    );
                }
            }

            attempts += 1;
            tracing::info!(
                market = %self.ticker,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                "Resubscribing"
            );

            tokio::select! {
                _ = cancelled(&mut shutdown) => break,
                _ = sleep(delay) => {}
            }
            delay = (delay * 2).min(max_delay);
        }

        tracing::info!(market = %self.ticker, "Stopped watching");
        Ok(())
    }

    fn print(&self, book: &crate::orderbook::DualSideBook) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(book)?);
        } else {
            println!("{}", summarize(book, self.quantity)?);
        }
        Ok(())
    }
}

/// First and largest resubscription delay
fn backoff_bounds(feed: &FeedConfig) -> (Duration, Duration) {
    let initial = Duration::from_millis(feed.initial_backoff_ms).max(MIN_BACKOFF);
    let max = Duration::from_millis(feed.max_backoff_ms).max(initial);
    (initial, max)
}
