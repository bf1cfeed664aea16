//! # cycleon-core: Pure Business Logic for Cycleon
//!
//! This crate holds the rules of the bike-rental domain as pure functions
//! and plain data types. Nothing in here touches a database or a socket.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cycleon Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/api)                          │   │
//! │  │    bookRide, endRide, addBalance, adminActions                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                cycleon-rides (Ride Engine)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cycleon-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   fare    │  │ validation│  │   │
//! │  │   │ Location  │  │   Money   │  │ FareRate  │  │   rules   │  │   │
//! │  │   │ ActiveRide│  │           │  │ compute   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 cycleon-db (Database Layer)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Location, Bike, Account, ActiveRide, RideRecord)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`fare`] - Time-based fare calculation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use cycleon_core::fare::{compute_fare, FareRate};
//!
//! // One hour at 10.00/hour
//! let fare = compute_fare(0, 3_600_000, FareRate::from_cents_per_hour(1000));
//! assert_eq!(fare.cents(), 1000);
//! ```

pub mod error;
pub mod fare;
pub mod money;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use fare::{compute_fare, FareRate};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default hourly fare in cents (10.00 per hour).
pub const DEFAULT_FARE_RATE_CENTS_PER_HOUR: i64 = 1_000;

/// Minimum balance in cents a user must hold before a ride can be booked.
///
/// ## Business Reason
/// This is a pre-authorization check only. Nothing is reserved at booking
/// time; the fare is debited when the ride ends and may take the balance
/// below zero.
pub const MIN_BOOKING_BALANCE_CENTS: i64 = 1_000;

/// Largest single top-up in cents (10,000.00).
pub const MAX_TOP_UP_CENTS: i64 = 1_000_000;

/// Minimum length of a location name.
pub const MIN_LOCATION_NAME_LEN: usize = 4;

/// Minimum length of a bike name.
pub const MIN_BIKE_NAME_LEN: usize = 2;

/// Minimum length of a bike description.
pub const MIN_BIKE_DESCRIPTION_LEN: usize = 10;
