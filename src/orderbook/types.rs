//! Order book primitive types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Price of one side of a binary contract, in whole cents (0..=100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Cents(pub(super) u8);

impl Cents {
    /// Contract payout; a YES and a NO share together are always worth this much
    pub const PAR: Cents = Cents(100);

    /// Create a price, rejecting anything outside 0..=100
    pub fn new(value: u8) -> Result<Self, BookError> {
        if value > Self::PAR.0 {
            return Err(BookError::PriceOutOfRange(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Raw cent value
    pub fn value(self) -> u8 {
        self.0
    }

    /// Price of the opposite side implied by this price (`100 - p`)
    pub fn complement(self) -> Cents {
        Cents(Self::PAR.0 - self.0)
    }

    /// Price in dollars
    pub fn to_dollars(self) -> Decimal {
        Decimal::new(i64::from(self.0), 2)
    }
}

impl TryFrom<i64> for Cents {
    type Error = BookError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| BookError::PriceOutOfRange(value))
            .and_then(Cents::new)
    }
}

impl From<Cents> for u8 {
    fn from(price: Cents) -> Self {
        price.0
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}¢", self.0)
    }
}

/// One of the two complementary outcomes of a binary contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// The other outcome
    pub fn opposite(self) -> Side {
        match self {
            Side::Yes => Side::No,
            Side::No => Side::Yes,
        }
    }

    /// Wire label
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Yes => "yes",
            Side::No => "no",
        }
    }
}

impl FromStr for Side {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Side::Yes),
            "no" => Ok(Side::No),
            other => Err(BookError::UnknownSide(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate resting size at one price.
///
/// Serialized in the exchange's `[price, quantity]` array form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Cents, u64)", into = "(Cents, u64)")]
pub struct PriceLevel {
    /// Price of the resting bids
    pub price: Cents,
    /// Total contracts resting at this price
    pub quantity: u64,
}

impl PriceLevel {
    /// Create a new price level
    pub fn new(price: Cents, quantity: u64) -> Self {
        Self { price, quantity }
    }
}

impl From<(Cents, u64)> for PriceLevel {
    fn from((price, quantity): (Cents, u64)) -> Self {
        Self { price, quantity }
    }
}

impl From<PriceLevel> for (Cents, u64) {
    fn from(level: PriceLevel) -> Self {
        (level.price, level.quantity)
    }
}

/// Order book mutation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// A delta would leave a level below zero
    #[error("Delta {delta} at {price} would leave negative quantity (current {current})")]
    NegativeQuantity { price: Cents, current: u64, delta: i64 },
    /// A delta would overflow the level quantity
    #[error("Delta {delta} at {price} overflows quantity (current {current})")]
    QuantityOverflow { price: Cents, current: u64, delta: i64 },
    /// Price outside 0..=100 cents
    #[error("Price out of range: {0}")]
    PriceOutOfRange(i64),
    /// Side label other than "yes" or "no"
    #[error("Unknown side: {0:?}")]
    UnknownSide(String),
}

/// Pricing query errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Wanted quantity must be positive
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
}
