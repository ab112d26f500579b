//! Two-sided order book snapshot

use super::pricing;
use super::{Cents, PriceLevelBook, PricingError, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of both sides of one binary market.
///
/// The two books hold resting *bids*. Each side is valid on its own; the
/// exchange, not this type, keeps them arbitrage-consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualSideBook {
    /// Market ticker
    pub market_id: String,
    /// Resting YES bids
    pub yes: PriceLevelBook,
    /// Resting NO bids
    pub no: PriceLevelBook,
    /// When this snapshot was captured
    pub loaded_at: DateTime<Utc>,
}

impl DualSideBook {
    /// Create an empty book for a market
    pub fn new(market_id: impl Into<String>) -> Self {
        Self::from_sides(market_id, PriceLevelBook::new(), PriceLevelBook::new())
    }

    /// Create a snapshot from both sides, stamped now
    pub fn from_sides(market_id: impl Into<String>, yes: PriceLevelBook, no: PriceLevelBook) -> Self {
        Self {
            market_id: market_id.into(),
            yes,
            no,
            loaded_at: Utc::now(),
        }
    }

    /// Resting bids on `side`
    pub fn bids(&self, side: Side) -> &PriceLevelBook {
        match side {
            Side::Yes => &self.yes,
            Side::No => &self.no,
        }
    }

    /// Highest resting bid on `side`
    pub fn best_bid(&self, side: Side) -> Option<Cents> {
        self.bids(side).best_price()
    }

    /// Cheapest price at which `side` can be bought right now
    pub fn best_ask(&self, side: Side) -> Option<Cents> {
        self.best_bid(side.opposite()).map(Cents::complement)
    }

    /// Average price to buy `quantity` contracts of `side`, rounded up
    pub fn best_offer(&self, side: Side, quantity: i64) -> Result<Option<Cents>, PricingError> {
        pricing::best_execution_price(self.bids(side.opposite()), quantity)
    }

    /// Cost in cents of buying every `side` contract on offer
    pub fn liquidity(&self, side: Side) -> u64 {
        pricing::total_liquidity(self.bids(side.opposite()))
    }

    /// Number of `side` contracts on offer
    pub fn total_offers(&self, side: Side) -> u64 {
        pricing::total_offers(self.bids(side.opposite()))
    }

    /// Number of `side` contracts on offer at `limit` or cheaper
    pub fn offers_under_limit(&self, side: Side, limit: Cents) -> u64 {
        pricing::offers_under_limit(self.bids(side.opposite()), limit)
    }

    /// Check whether both sides hold the same levels, ignoring market id and timestamp
    pub fn same_depth(&self, other: &DualSideBook) -> bool {
        self.yes == other.yes && self.no == other.no
    }
}
