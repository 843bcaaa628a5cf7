//! # Money
//!
//! Prices are integer cents. A price is parsed once at the boundary into
//! cents and never touches a float again until it is written to an export
//! cell.
//!
//! Arithmetic saturates at the `i64` range. Inputs are bounded by
//! [`MAX_PRICE`](crate::validation::MAX_PRICE) and
//! [`MAX_QUANTITY`](crate::validation::MAX_QUANTITY), so saturation is only
//! reachable through hand-edited stored data, and it must not panic there
//! either.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use crate::error::ValidationError;
use crate::types::Discount;
use crate::validation::parse_hundredths;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// manual price "9.99" ──► Money::parse ──► Entry.price ──► export cell 9.99
///                                              │
///                                              └──► Ledger::total_value
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use scanlog_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Value in major units, for spreadsheet cells only.
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses a decimal string such as `"9.99"`, `"10"` or `".5"`.
    ///
    /// ## Rules
    /// - Surrounding whitespace is ignored
    /// - At most two fractional digits; a third digit is rounded half-up
    /// - A leading `-` is accepted here; callers decide whether negatives
    ///   are allowed
    ///
    /// ```rust
    /// use scanlog_core::money::Money;
    ///
    /// assert_eq!(Money::parse("9.99").unwrap().cents(), 999);
    /// assert_eq!(Money::parse("10").unwrap().cents(), 1000);
    /// assert_eq!(Money::parse("0.125").unwrap().cents(), 13);
    /// assert!(Money::parse("abc").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Money, ValidationError> {
        parse_hundredths("price", raw).map(Money)
    }

    /// Line total for a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ```rust
    /// use scanlog_core::{money::Money, types::Discount};
    ///
    /// let subtotal = Money::from_cents(10000);
    /// assert_eq!(subtotal.apply_discount(Discount::from_bps(1000)).cents(), 9000);
    /// ```
    pub fn apply_discount(&self, discount: Discount) -> Money {
        let off = (self.0 as i128 * discount.bps() as i128 + 5000) / 10000;
        Money::from_cents(self.0.saturating_sub(off as i64))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal, no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(999).to_string(), "9.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("9.99").unwrap(), Money::from_cents(999));
        assert_eq!(Money::parse(" 10 ").unwrap(), Money::from_cents(1000));
        assert_eq!(Money::parse("0.5").unwrap(), Money::from_cents(50));
        assert_eq!(Money::parse(".5").unwrap(), Money::from_cents(50));
        assert_eq!(Money::parse("3.").unwrap(), Money::from_cents(300));
        assert_eq!(Money::parse("-1.25").unwrap(), Money::from_cents(-125));
        assert_eq!(Money::parse("1.005").unwrap(), Money::from_cents(101));

        assert!(Money::parse("").is_err());
        assert!(Money::parse(".").is_err());
        assert!(Money::parse("1,50").is_err());
        assert!(Money::parse("12abc").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(a.multiply_quantity(2).cents(), 2000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let big = Money::from_cents(i64::MAX / 2 + 1);

        assert_eq!(big.multiply_quantity(3).cents(), i64::MAX);
        assert_eq!((big + big).cents(), i64::MAX);

        let mut acc = big;
        acc += big;
        assert_eq!(acc, Money::from_cents(i64::MAX));

        let total: Money = vec![big, big, big].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_discount() {
        let subtotal = Money::from_cents(1999);
        let discounted = subtotal.apply_discount(Discount::from_bps(1000));
        // 10% of 19.99 = 1.999 → 2.00 off
        assert_eq!(discounted.cents(), 1799);
        assert_eq!(subtotal.apply_discount(Discount::zero()), subtotal);
    }

    #[test]
    fn test_serializes_as_plain_cents() {
        let json = serde_json::to_string(&Money::from_cents(999)).unwrap();
        assert_eq!(json, "999");
    }
}
