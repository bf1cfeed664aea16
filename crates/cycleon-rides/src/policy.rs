//! # Ride Policy
//!
//! The two pricing knobs the engine needs, with defaults from
//! `cycleon-core`.

use cycleon_core::{FareRate, Money, DEFAULT_FARE_RATE_CENTS_PER_HOUR, MIN_BOOKING_BALANCE_CENTS};

/// Pricing policy applied by [`RideEngine`](crate::RideEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RidePolicy {
    /// Hourly price of a ride.
    pub fare_rate: FareRate,

    /// Balance a rider must hold to book. Checked at booking only; ending a
    /// ride may take the balance below zero.
    pub min_booking_balance: Money,
}

impl RidePolicy {
    pub fn new(fare_rate: FareRate, min_booking_balance: Money) -> Self {
        RidePolicy {
            fare_rate,
            min_booking_balance,
        }
    }
}

impl Default for RidePolicy {
    fn default() -> Self {
        RidePolicy {
            fare_rate: FareRate::from_cents_per_hour(DEFAULT_FARE_RATE_CENTS_PER_HOUR),
            min_booking_balance: Money::from_cents(MIN_BOOKING_BALANCE_CENTS),
        }
    }
}
