//! Type-safe price representation using decimal arithmetic.
//!
//! The boutique trades in a single currency (NGN), so `Price` carries the
//! amount only. The payment gateway is charged in minor units (kobo), which
//! is the one place the decimal representation leaves this type.

use core::fmt;
use core::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative amount of Nigerian naira.
///
/// Stored in the currency's standard unit (naira, not kobo), matching the
/// catalog's `NUMERIC` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero naira.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal naira amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of naira.
    ///
    /// # Panics
    ///
    /// Never panics: whole non-negative naira are always representable.
    #[must_use]
    pub fn from_naira(naira: u64) -> Self {
        Self(Decimal::from(naira))
    }

    /// The decimal naira amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount in kobo (minor units), as charged through the gateway.
    ///
    /// Returns `None` if the amount does not fit in an `i64` after the
    /// minor-unit shift, which no real catalog price does.
    #[must_use]
    pub fn to_kobo(&self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED).round().to_i64()
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\u{20a6}{}", self.0)
    }
}

// SQLx support (with postgres feature): maps to NUMERIC via rust_decimal.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::new(Decimal::from(-1)),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_to_kobo() {
        assert_eq!(Price::from_naira(350_000).to_kobo(), Some(35_000_000));
        assert_eq!(Price::ZERO.to_kobo(), Some(0));
    }

    #[test]
    fn test_times_and_sum() {
        let a = Price::from_naira(350_000).times(2);
        assert_eq!(a, Price::from_naira(700_000));

        let total: Price = [Price::from_naira(500), Price::from_naira(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_naira(750));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_naira(500_000).to_string(), "\u{20a6}500000");
    }

    #[test]
    fn test_serde_transparent() {
        let price = Price::from_naira(1_000_000);
        let json = serde_json::to_string(&price).unwrap();
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
