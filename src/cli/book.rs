//! Book command implementation

use super::format_price;
use crate::config::Config;
use crate::orderbook::{Cents, DualSideBook, Side};
use crate::rest::RestClient;
use clap::Args;

#[derive(Args, Debug)]
pub struct BookArgs {
    /// Market ticker
    pub ticker: String,

    /// Contracts to price on each side
    #[arg(short, long, default_value_t = 100)]
    pub quantity: i64,

    /// Also count contracts on offer at or below this price (cents)
    #[arg(short, long)]
    pub limit: Option<u8>,

    /// Print the book as JSON
    #[arg(long)]
    pub json: bool,
}

impl BookArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let limit = self.limit.map(Cents::new).transpose()?;

        let client = RestClient::with_config(config.rest_client())?;
        let book = client.fetch_book(&self.ticker).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&book)?);
            return Ok(());
        }

        print_book(&book, self.quantity, limit)
    }
}

fn print_book(book: &DualSideBook, quantity: i64, limit: Option<Cents>) -> anyhow::Result<()> {
    println!("{} at {}", book.market_id, book.loaded_at.to_rfc3339());

    for side in [Side::Yes, Side::No] {
        println!();
        println!("  {} bids:", side.as_str().to_uppercase());
        for level in book.bids(side).iter().rev() {
            println!("    {:>6} x {}", format_price(Some(level.price)), level.quantity);
        }

        println!("  Buying {}:", side.as_str().to_uppercase());
        println!("    best ask:        {}", format_price(book.best_ask(side)));
        println!(
            "    {} contracts:   {}",
            quantity,
            format_price(book.best_offer(side, quantity)?)
        );
        println!("    on offer:        {}", book.total_offers(side));
        println!("    cost of all:     {}¢", book.liquidity(side));
        if let Some(limit) = limit {
            println!(
                "    at or under {}: {}",
                format_price(Some(limit)),
                book.offers_under_limit(side, limit)
            );
        }
    }

    Ok(())
}
