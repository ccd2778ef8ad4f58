//! Exact money type backed by rust_decimal.
//!
//! All payout arithmetic goes through this wrapper so the 2-decimal rounding
//! rule is applied in exactly one place.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exact monetary amount.
///
/// Backed by rust_decimal to avoid floating-point drift.
/// Serializes to a JSON number (not a string) by default.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Money {
    /// Create a Money from a RustDecimal.
    pub fn new(value: RustDecimal) -> Self {
        Money(value)
    }

    /// Parse a Money from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Money)
    }

    /// Whole-unit amount (e.g. `Money::from_major(10)` is 10.00).
    pub fn from_major(units: i64) -> Self {
        Money(RustDecimal::from(units))
    }

    /// Format as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    /// Get the underlying RustDecimal.
    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Money(RustDecimal::ZERO)
    }

    /// The multiplicative identity (1).
    pub fn one() -> Self {
        Money(RustDecimal::ONE)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Round to 2 decimal places (banker's rounding).
    ///
    /// The payout split calls this exactly once per deposit; nothing else in
    /// the crate re-rounds.
    pub fn round_2(&self) -> Self {
        Money(self.0.round_dp(2))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Money {
    fn from(value: RustDecimal) -> Self {
        Money(value)
    }
}

impl From<Money> for RustDecimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Money {
    type Output = Money;

    fn mul(self, rhs: Money) -> Money {
        Money(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_parse_roundtrip() {
        let test_cases = vec!["123.456", "0.0001", "1000000", "-123.456", "0", "9.99"];

        for s in test_cases {
            let money = Money::from_str_canonical(s).expect("parse failed");
            let formatted = money.to_canonical_string();
            let reparsed = Money::from_str_canonical(&formatted).expect("reparse failed");
            assert_eq!(money, reparsed, "roundtrip failed for {}", s);
        }
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_str_canonical("10.5").unwrap();
        let b = Money::from_str_canonical("2.5").unwrap();

        assert_eq!((a + b).to_canonical_string(), "13");
        assert_eq!((a - b).to_canonical_string(), "8");
        assert_eq!((a * b).to_canonical_string(), "26.25");
    }

    #[test]
    fn test_money_round_2() {
        let m = Money::from_str_canonical("9.005").unwrap();
        assert_eq!(m.round_2().to_canonical_string(), "9");

        let m = Money::from_str_canonical("8.999").unwrap();
        assert_eq!(m.round_2().to_canonical_string(), "9");

        let m = Money::from_str_canonical("8.994").unwrap();
        assert_eq!(m.round_2().to_canonical_string(), "8.99");
    }

    #[test]
    fn test_money_json_serialization() {
        let money = Money::from_str_canonical("123.45").unwrap();
        let json = serde_json::to_value(money).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.45");
    }

    #[test]
    fn test_money_from_major() {
        assert_eq!(Money::from_major(10).to_canonical_string(), "10");
        assert_eq!(Money::from_major(0), Money::zero());
    }
}
