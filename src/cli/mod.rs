//! CLI interface for kalshi-book
//!
//! Provides subcommands for:
//! - `watch`: Stream a market's order book
//! - `book`: Fetch a market's order book once over REST
//! - `verify`: Check the streamed book against the REST book
//! - `config`: Show configuration

mod book;
mod verify;
mod watch;

pub use book::BookArgs;
pub use verify::{verify_book, VerifyArgs, VerifyOutcome};
pub use watch::WatchArgs;

use crate::orderbook::{Cents, DualSideBook, Side};
use clap::{Parser, Subcommand};
use tokio::sync::watch as signal;

#[derive(Parser, Debug)]
#[command(name = "kalshi-book")]
#[command(about = "Streaming order book reconciliation for Kalshi binary markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream a market's order book
    Watch(WatchArgs),
    /// Fetch a market's order book over REST
    Book(BookArgs),
    /// Compare the streamed book with the REST book
    Verify(VerifyArgs),
    /// Show configuration
    Config,
}

/// Shutdown flag that flips to `true` on Ctrl-C
pub(crate) fn shutdown_on_ctrl_c() -> (signal::Sender<bool>, signal::Receiver<bool>) {
    let (tx, rx) = signal::channel(false);
    let notify = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            let _ = notify.send(true);
        }
    });
    (tx, rx)
}

/// Dollar price, or a dash when there is none
pub(crate) fn format_price(price: Option<Cents>) -> String {
    match price {
        Some(p) => format!("${}", p.to_dollars()),
        None => "-".to_string(),
    }
}

/// One-line summary of a book
pub(crate) fn summarize(book: &DualSideBook, quantity: i64) -> anyhow::Result<String> {
    let buy_yes = book.best_offer(Side::Yes, quantity)?;
    let buy_no = book.best_offer(Side::No, quantity)?;

    Ok(format!(
        "{} yes {}/{} no {}/{} | buy {} yes @ {} | buy {} no @ {} | levels {}/{}",
        book.market_id,
        format_price(book.best_bid(Side::Yes)),
        format_price(book.best_ask(Side::Yes)),
        format_price(book.best_bid(Side::No)),
        format_price(book.best_ask(Side::No)),
        quantity,
        format_price(buy_yes),
        quantity,
        format_price(buy_no),
        book.yes.len(),
        book.no.len(),
    ))
}
