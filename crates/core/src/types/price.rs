//! Listing price using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("not a valid number")]
    NotANumber,
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// More than two digits after the decimal point.
    #[error("price can have at most 2 decimal places")]
    TooPrecise,
    /// The amount does not fit the stored column.
    #[error("price is too large")]
    TooLarge,
}

/// The asking price of a listing.
///
/// Always non-negative with at most two fraction digits, matching the
/// `NUMERIC(10, 2)` column it is stored in. Displays with exactly two
/// fraction digits.
///
/// ```
/// use krishop_core::Price;
///
/// let price = Price::parse("12.5").unwrap();
/// assert_eq!(price.to_string(), "12.50");
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Largest storable price (8 integer digits, 2 fraction digits).
    pub const MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// Parse a price typed into a form.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the input is not a decimal, is negative,
    /// has more than two fraction digits, or exceeds [`Price::MAX`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s).map_err(|_| PriceError::NotANumber)?;
        Self::from_decimal(amount)
    }

    /// Validate an amount read from storage or built in code.
    ///
    /// # Errors
    ///
    /// Same rules as [`Price::parse`].
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let amount = amount.normalize();
        if amount.scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        if amount > Self::MAX {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount.abs()))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
