//! Verify command implementation
//!
//! Takes the first streamed book and polls REST until the two agree. The REST
//! book can lag or lead the stream, so a single mismatch proves nothing.

use super::shutdown_on_ctrl_c;
use crate::config::Config;
use crate::feed::FeedClient;
use crate::orderbook::DualSideBook;
use crate::rest::{BookFetcher, RestClient};
use clap::Args;
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Market ticker
    pub ticker: String,

    /// Give up after this many seconds
    #[arg(short, long, default_value_t = 10)]
    pub timeout: u64,

    /// Seconds between REST polls
    #[arg(short, long, default_value_t = 1)]
    pub interval: u64,
}

/// Result of comparing a streamed book with polled ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// A polled book matched
    Matched { polls: u32 },
    /// No polled book matched before the deadline
    TimedOut { polls: u32 },
}

/// Poll `fetcher` until its book has the same depth as `streamed`.
///
/// Fetch errors count as a mismatch and polling goes on.
pub async fn verify_book<F>(
    fetcher: &F,
    streamed: &DualSideBook,
    timeout: Duration,
    interval: Duration,
) -> VerifyOutcome
where
    F: BookFetcher + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let mut polls = 0;

    loop {
        polls += 1;
        match fetcher.fetch_book(&streamed.market_id).await {
            Ok(polled) if polled.same_depth(streamed) => {
                tracing::info!(market = %streamed.market_id, polls, "Books match");
                return VerifyOutcome::Matched { polls };
            }
            Ok(polled) => {
                tracing::debug!(
                    market = %streamed.market_id,
                    polls,
                    rest_yes = polled.yes.len(),
                    rest_no = polled.no.len(),
                    "Books differ"
                );
            }
            Err(e) => {
                tracing::warn!(market = %streamed.market_id, error = %e, "Poll failed");
            }
        }

        if Instant::now() + interval > deadline {
            return VerifyOutcome::TimedOut { polls };
        }
        sleep(interval).await;
    }
}

impl VerifyArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let timeout = Duration::from_secs(self.timeout);
        let (signal, shutdown) = shutdown_on_ctrl_c();

        let client = FeedClient::with_config(config.feed_client());
        let mut subscription = client.subscribe(&self.ticker, shutdown).await?;

        let first = tokio::time::timeout(timeout, subscription.books.recv()).await;
        // one book is all this needs
        let _ = signal.send(true);
        drop(subscription.books);

        let streamed = match first {
            Ok(Some(book)) => book,
            Ok(None) => {
                let reason = match subscription.task.await {
                    Ok(Err(e)) => e.to_string(),
                    _ => "stream ended".to_string(),
                };
                anyhow::bail!("No book received for {}: {}", self.ticker, reason);
            }
            Err(_) => anyhow::bail!("No book received for {} within {:?}", self.ticker, timeout),
        };

        let rest = RestClient::with_config(config.rest_client())?;
        let interval = Duration::from_secs(self.interval.max(1));

        match verify_book(&rest, &streamed, timeout, interval).await {
            VerifyOutcome::Matched { polls } => {
                println!("{}: streamed book matches REST ({} polls)", self.ticker, polls);
                Ok(())
            }
            VerifyOutcome::TimedOut { polls } => {
                anyhow::bail!(
                    "{}: streamed book did not match REST after {} polls",
                    self.ticker,
                    polls
                )
            }
        }
    }
}
