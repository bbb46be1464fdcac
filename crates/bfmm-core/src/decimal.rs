//! Precision-safe numeric types for trading.
//!
//! Prices on the FX_BTC_JPY book are whole-yen ticks, so `Price` wraps an
//! `i64`. Sizes are fractional BTC and use `rust_decimal` for exact decimal
//! arithmetic, avoiding floating-point rounding errors in position math.

use crate::error::CoreError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Limit price in whole yen.
///
/// Wraps `i64` to provide type safety and prevent mixing prices
/// with sizes in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Convert a decimal wire price to an integer tick, truncating any
    /// fractional part (FX_BTC_JPY quotes integral yen).
    pub fn from_decimal(value: Decimal) -> Result<Self, CoreError> {
        value
            .trunc()
            .to_i64()
            .map(Self)
            .ok_or_else(|| CoreError::InvalidPrice(value.to_string()))
    }

    /// Offset by `delta` ticks. Positive moves up, negative down.
    #[inline]
    pub fn offset(&self, delta: i64) -> Self {
        Self(self.0 + delta)
    }

    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<i64> for Price {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Order/position size with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Clamp at zero (position netting never goes negative).
    #[inline]
    pub fn saturating_sub(&self, rhs: Size) -> Self {
        let diff = self.0 - rhs.0;
        if diff.is_sign_negative() {
            Self::ZERO
        } else {
            Self(diff)
        }
    }

    #[inline]
    pub fn min(&self, other: Size) -> Self {
        Self(self.0.min(other.0))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Size {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_offset() {
        let p = Price::new(100);
        assert_eq!(p.offset(1), Price::new(101));
        assert_eq!(p.offset(-1), Price::new(99));
    }

    #[test]
    fn test_price_from_decimal_truncates() {
        let p = Price::from_decimal(dec!(12345.9)).unwrap();
        assert_eq!(p, Price::new(12345));
    }

    #[test]
    fn test_size_saturating_sub() {
        let a = Size::new(dec!(0.01));
        let b = Size::new(dec!(0.03));
        assert_eq!(a.saturating_sub(b), Size::ZERO);
        assert_eq!(b.saturating_sub(a), Size::new(dec!(0.02)));
    }

    #[test]
    fn test_size_arithmetic() {
        let a = Size::new(dec!(0.01));
        let b = Size::new(dec!(0.02));
        assert_eq!(a + b, Size::new(dec!(0.03)));
        assert_eq!(b - a, Size::new(dec!(0.01)));
    }
}
