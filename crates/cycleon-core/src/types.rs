//! # Domain Types
//!
//! Core domain types used throughout Cycleon.
//!
//! ## Where a Bike Lives
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────────────┐     bookRide      ┌──────────────────────┐      │
//! │   │    Location      │ ────────────────► │   Account            │      │
//! │   │  ──────────────  │                   │  ──────────────────  │      │
//! │   │  name (unique)   │                   │  balance_cents       │      │
//! │   │  coordinates     │ ◄──────────────── │  active_ride: ──────────┐   │
//! │   │  bikes: [Bike]   │     endRide       └──────────────────────┘  │   │
//! │   └──────────────────┘                                             │   │
//! │                                            ┌───────────────────────▼┐  │
//! │   A bike is in exactly one of the two      │  ActiveRide            │  │
//! │   places at every instant.                 │  bike (copied by value)│  │
//! │                                            │  start / end Stop      │  │
//! │                                            └───────────┬────────────┘  │
//! │                                                        │ endRide       │
//! │                                            ┌───────────▼────────────┐  │
//! │                                            │  RideRecord (ledger)   │  │
//! │                                            │  + end_time, fare      │  │
//! │                                            └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Bike
// =============================================================================

/// A rentable bike.
///
/// Identity is a generated UUID that is never reused. Name and description
/// never change; only the place holding the bike does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bike {
    pub id: String,
    pub name: String,
    pub description: String,
}

// =============================================================================
// Location
// =============================================================================

/// A rental station and the bikes it currently holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Unique, human-readable name ("Elm St").
    #[serde(rename = "locationName")]
    pub name: String,

    /// Unique coordinates string.
    pub coordinates: String,

    /// Bikes docked here right now, in arrival order.
    pub bikes: Vec<Bike>,

    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Finds a bike in this snapshot.
    pub fn bike(&self, bike_id: &str) -> Option<&Bike> {
        self.bikes.iter().find(|b| b.id == bike_id)
    }

    /// Checks whether the snapshot holds the bike.
    pub fn has_bike(&self, bike_id: &str) -> bool {
        self.bike(bike_id).is_some()
    }

    /// The location's identity as copied into a ride.
    pub fn stop(&self) -> Stop {
        Stop {
            id: self.id.clone(),
            name: self.name.clone(),
            coordinates: self.coordinates.clone(),
        }
    }
}

// =============================================================================
// Stop
// =============================================================================

/// Location identity and coordinates captured by value when a ride is booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: String,
    #[serde(rename = "locationName")]
    pub name: String,
    pub coordinates: String,
}

/// Which end of a ride a location name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopRole {
    Start,
    End,
}

impl fmt::Display for StopRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopRole::Start => write!(f, "Start"),
            StopRole::End => write!(f, "End"),
        }
    }
}

// =============================================================================
// Active Ride
// =============================================================================

/// The ride a user is on right now.
///
/// Everything is a copy. Later changes to the inventory cannot alter a ride
/// already in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRide {
    /// Generated at booking. Settling a ride consumes this id exactly once.
    pub ride_id: String,

    pub bike: Bike,

    pub start: Stop,

    /// The bike is returned here when the ride ends.
    pub end: Stop,

    pub start_time: DateTime<Utc>,
}

impl ActiveRide {
    #[inline]
    pub fn bike_id(&self) -> &str {
        &self.bike.id
    }

    /// Closes the ride into its ledger entry.
    pub fn finish(self, user_id: &str, end_time: DateTime<Utc>, fare: Money) -> RideRecord {
        RideRecord {
            ride_id: self.ride_id,
            user_id: user_id.to_string(),
            bike: self.bike,
            start: self.start,
            end: self.end,
            start_time: self.start_time,
            end_time,
            fare_cents: fare.cents(),
        }
    }
}

// =============================================================================
// Ride Record
// =============================================================================

/// A completed ride. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRecord {
    pub ride_id: String,
    pub user_id: String,
    pub bike: Bike,
    pub start: Stop,
    /// Where the bike was actually returned.
    pub end: Stop,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Charged fare in cents.
    pub fare_cents: i64,
}

impl RideRecord {
    #[inline]
    pub fn fare(&self) -> Money {
        Money::from_cents(self.fare_cents)
    }
}

// =============================================================================
// Account
// =============================================================================

/// A rider's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique identifier (UUID v4), the `sub` of the rider's token.
    pub id: String,

    pub username: String,

    /// Balance in cents. Can be negative after a ride that cost more than
    /// the rider had left.
    pub balance_cents: i64,

    /// `Some` exactly while the rider holds a bike.
    pub active_ride: Option<ActiveRide>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Returns the balance as a Money type.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    #[inline]
    pub fn has_active_ride(&self) -> bool {
        self.active_ride.is_some()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
