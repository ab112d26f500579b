//! Per-side price level book

use super::{BookError, Cents, PriceLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resting bid quantity at each price for one side of one market.
///
/// Levels with zero quantity are never stored. Not synchronized: a book has a
/// single owner and readers get cloned snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PriceLevel>", into = "Vec<PriceLevel>")]
pub struct PriceLevelBook {
    levels: BTreeMap<Cents, u64>,
}

impl PriceLevelBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the quantity resting at `price`.
    ///
    /// A result of zero removes the level. A negative result means the feed
    /// and the book disagree; the book is left untouched and an error returned.
    pub fn apply_delta(&mut self, price: Cents, delta: i64) -> Result<(), BookError> {
        let current = self.quantity_at(price);
        let updated = i128::from(current) + i128::from(delta);

        if updated < 0 {
            return Err(BookError::NegativeQuantity {
                price,
                current,
                delta,
            });
        }
        let updated = u64::try_from(updated).map_err(|_| BookError::QuantityOverflow {
            price,
            current,
            delta,
        })?;

        if updated == 0 {
            self.levels.remove(&price);
        } else {
            self.levels.insert(price, updated);
        }
        Ok(())
    }

    /// Replace the whole book with `levels`
    pub fn load_snapshot<I>(&mut self, levels: I)
    where
        I: IntoIterator<Item = PriceLevel>,
    {
        self.levels.clear();
        for level in levels {
            if level.quantity > 0 {
                self.levels.insert(level.price, level.quantity);
            }
        }
    }

    /// Levels sorted ascending by price
    pub fn ordered_levels(&self) -> Vec<PriceLevel> {
        self.iter().collect()
    }

    /// Iterate levels ascending by price; `.rev()` walks best bid first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = PriceLevel> + '_ {
        self.levels
            .iter()
            .map(|(&price, &quantity)| PriceLevel { price, quantity })
    }

    /// Quantity resting at `price` (0 if no level)
    pub fn quantity_at(&self, price: Cents) -> u64 {
        self.levels.get(&price).copied().unwrap_or(0)
    }

    /// Highest bid price
    pub fn best_price(&self) -> Option<Cents> {
        self.levels.keys().next_back().copied()
    }

    /// Number of populated levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if the book has no levels
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<PriceLevel> for PriceLevelBook {
    fn from_iter<I: IntoIterator<Item = PriceLevel>>(iter: I) -> Self {
        let mut book = Self::new();
        book.load_snapshot(iter);
        book
    }
}

impl From<Vec<PriceLevel>> for PriceLevelBook {
    fn from(levels: Vec<PriceLevel>) -> Self {
        levels.into_iter().collect()
    }
}

impl From<PriceLevelBook> for Vec<PriceLevel> {
    fn from(book: PriceLevelBook) -> Self {
        book.ordered_levels()
    }
}
