//! # Fare Calculator
//!
//! Turns ride duration into a charge.
//!
//! ## Formula
//! ```text
//! fare_cents = round_half_up(elapsed_ms × rate_cents_per_hour / 3_600_000)
//!
//!   elapsed_ms ≤ 0  ──►  0        (clock skew never produces a refund)
//! ```
//!
//! The product is computed in i128 so a very long ride at a high rate
//! cannot overflow before the division.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::DEFAULT_FARE_RATE_CENTS_PER_HOUR;

/// Milliseconds in one hour.
pub const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Hourly ride price in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareRate(i64);

impl FareRate {
    /// Creates a rate from cents per hour.
    #[inline]
    pub const fn from_cents_per_hour(cents: i64) -> Self {
        FareRate(cents)
    }

    #[inline]
    pub const fn cents_per_hour(&self) -> i64 {
        self.0
    }

    /// The hourly price as money.
    #[inline]
    pub const fn per_hour(&self) -> Money {
        Money::from_cents(self.0)
    }
}

impl Default for FareRate {
    fn default() -> Self {
        FareRate(DEFAULT_FARE_RATE_CENTS_PER_HOUR)
    }
}

/// Computes the fare for a ride between two epoch-millisecond instants.
///
/// ## Example
/// ```rust
/// use cycleon_core::fare::{compute_fare, FareRate};
///
/// let rate = FareRate::from_cents_per_hour(1000);
///
/// // 30 minutes at 10.00/hour
/// assert_eq!(compute_fare(0, 1_800_000, rate).cents(), 500);
///
/// // End before start is clamped
/// assert_eq!(compute_fare(10_000, 5_000, rate).cents(), 0);
/// ```
pub fn compute_fare(start_ms: i64, end_ms: i64, rate: FareRate) -> Money {
    let elapsed = i128::from(end_ms) - i128::from(start_ms);
    if elapsed <= 0 || rate.cents_per_hour() <= 0 {
        return Money::zero();
    }

    let hour = i128::from(MILLIS_PER_HOUR);
    let cents = (elapsed * i128::from(rate.cents_per_hour()) + hour / 2) / hour;

    Money::from_cents(i64::try_from(cents).unwrap_or(i64::MAX))
}

/// [`compute_fare`] over chrono timestamps.
pub fn fare_between(start: DateTime<Utc>, end: DateTime<Utc>, rate: FareRate) -> Money {
    compute_fare(start.timestamp_millis(), end.timestamp_millis(), rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const RATE: FareRate = FareRate::from_cents_per_hour(1000);

    #[test]
    fn test_one_hour_costs_the_hourly_rate() {
        assert_eq!(compute_fare(0, MILLIS_PER_HOUR, RATE), Money::from_cents(1000));
    }

    #[test]
    fn test_rounds_half_up_to_the_cent() {
        // 1.8s at 1000c/h = 0.5 cents
        assert_eq!(compute_fare(0, 1_800, RATE).cents(), 1);
        // 1.7s = 0.47 cents
        assert_eq!(compute_fare(0, 1_700, RATE).cents(), 0);
        // 90 minutes
        assert_eq!(compute_fare(0, 5_400_000, RATE).cents(), 1500);
    }

    #[test]
    fn test_non_positive_elapsed_is_free() {
        assert!(compute_fare(5_000, 5_000, RATE).is_zero());
        assert!(compute_fare(5_000, 1_000, RATE).is_zero());
        assert!(compute_fare(i64::MAX, i64::MIN, RATE).is_zero());
    }

    #[test]
    fn test_monotonic_in_elapsed_time() {
        let mut previous = Money::zero();
        for elapsed in (-60_000..=7_200_000).step_by(1_234) {
            let fare = compute_fare(1_000_000, 1_000_000 + elapsed, RATE);
            assert!(fare >= previous, "fare dropped at elapsed {elapsed}");
            assert!(!fare.is_negative());
            previous = fare;
        }
    }

    #[test]
    fn test_extreme_duration_saturates() {
        let rate = FareRate::from_cents_per_hour(i64::MAX);
        assert_eq!(compute_fare(i64::MIN, i64::MAX, rate).cents(), i64::MAX);
    }

    #[test]
    fn test_fare_between_timestamps() {
        let start = Utc::now();
        let end = start + Duration::minutes(45);
        assert_eq!(fare_between(start, end, RATE).cents(), 750);
    }

    #[test]
    fn test_default_rate() {
        assert_eq!(FareRate::default().cents_per_hour(), 1000);
        assert_eq!(FareRate::default().per_hour().to_string(), "10.00");
    }
}
