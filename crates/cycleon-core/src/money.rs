//! # Money Module
//!
//! Provides the `Money` type for balances and fares.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A balance topped up ten times by 0.10 must read exactly 1.00.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Balances, fares and rates are all i64 cents.                         │
//! │    Rounding happens once, in the fare calculator, and is explicit.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cycleon_core::money::Money;
//!
//! let fare = Money::from_cents(1000); // 10.00
//! assert_eq!(fare.to_string(), "10.00");
//! assert_eq!((-fare).cents(), -1000);  // the debit applied to a balance
//!
//! // Amounts arriving as text are parsed exactly, never through f64
//! assert_eq!(Money::parse_units("12.5").unwrap().cents(), 1250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: balances may read negative after a ride that costs
///   more than the user had left
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use cycleon_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal amount in currency units ("10", "10.5", "10.50").
    ///
    /// ## Rules
    /// - Optional leading `-`
    /// - At most two fractional digits
    /// - Digits only otherwise
    ///
    /// ## Example
    /// ```rust
    /// use cycleon_core::money::Money;
    ///
    /// assert_eq!(Money::parse_units("10").unwrap().cents(), 1000);
    /// assert_eq!(Money::parse_units("0.05").unwrap().cents(), 5);
    /// assert!(Money::parse_units("1.005").is_err());
    /// assert!(Money::parse_units("ten").is_err());
    /// ```
    pub fn parse_units(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("must be a number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a number"));
        }
        if fraction.len() > 2 {
            return Err(invalid("must have at most two decimal places"));
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("is too large"))?
        };
        // "5" after the point means 50 cents, not 5
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("must be a number"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("must be a number"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
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

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount with two decimals and no currency symbol.
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

/// Negation turns a fare into the balance delta that debits it.
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
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
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
    }

    #[test]
    fn test_negation() {
        assert_eq!((-Money::from_cents(1000)).cents(), -1000);
        assert_eq!((-Money::from_cents(-550)).to_string(), "5.50");
        assert_eq!(-Money::zero(), Money::zero());
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(Money::parse_units("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse_units("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse_units("10.55").unwrap().cents(), 1055);
        assert_eq!(Money::parse_units(".75").unwrap().cents(), 75);
        assert_eq!(Money::parse_units("-2.25").unwrap().cents(), -225);

        assert!(Money::parse_units("").is_err());
        assert!(Money::parse_units(".").is_err());
        assert!(Money::parse_units("1.234").is_err());
        assert!(Money::parse_units("1e3").is_err());
        assert!(Money::parse_units("99999999999999999999").is_err());
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
    }
}
