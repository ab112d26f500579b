//! Execution price and liquidity queries
//!
//! A resting bid on one side at price `p` is an offer on the other side at
//! `100 - p`. Every function here takes the book of bids on the side *opposite*
//! to the one a taker wants to buy, and reports prices from the taker's view.
//! Walking that book from its highest bid downward visits the taker's cheapest
//! offers first.

use super::{Cents, PriceLevelBook, PricingError};

/// Average price a taker pays to buy `want_quantity` contracts against `book`.
///
/// The average is rounded up so the cost of a hypothetical trade is never
/// under-reported. Returns `Ok(None)` when the book cannot fill the whole
/// quantity.
pub fn best_execution_price(
    book: &PriceLevelBook,
    want_quantity: i64,
) -> Result<Option<Cents>, PricingError> {
    if want_quantity <= 0 {
        return Err(PricingError::InvalidQuantity(want_quantity));
    }
    let want = want_quantity as u64;

    let mut found: u64 = 0;
    let mut weighted: u128 = 0;

    for level in book.iter().rev() {
        let take = level.quantity.min(want - found);
        found += take;
        weighted += u128::from(take) * u128::from(level.price.complement().value());

        assert!(
            found <= want,
            "filled {found} contracts for an order of {want}"
        );
        if found == want {
            let average = weighted.div_ceil(u128::from(want));
            // a weighted mean of prices in 0..=100 stays in 0..=100
            return Ok(Some(Cents(average as u8)));
        }
    }

    Ok(None)
}

/// Total cost in cents of buying every offer in the book.
///
/// Saturates at `u64::MAX`; wire quantities are unbounded `u64`.
pub fn total_liquidity(book: &PriceLevelBook) -> u64 {
    book.iter().fold(0u64, |acc, level| {
        acc.saturating_add(
            level
                .quantity
                .saturating_mul(u64::from(level.price.complement().value())),
        )
    })
}

/// Total contracts on offer, saturating at `u64::MAX`
pub fn total_offers(book: &PriceLevelBook) -> u64 {
    book.iter()
        .fold(0u64, |acc, level| acc.saturating_add(level.quantity))
}

/// Contracts on offer at a taker price of `limit` or better, saturating at `u64::MAX`
pub fn offers_under_limit(book: &PriceLevelBook, limit: Cents) -> u64 {
    book.iter()
        .rev()
        .take_while(|level| level.price.complement() <= limit)
        .fold(0u64, |acc, level| acc.saturating_add(level.quantity))
}
