//! Order book module
//!
//! Per-market bid depth for binary contracts, and the execution price and
//! liquidity queries run against it.

mod book;
pub mod pricing;
mod snapshot;
mod types;

pub use book::PriceLevelBook;
pub use snapshot::DualSideBook;
pub use types::{BookError, Cents, PriceLevel, PricingError, Side};
