//! # cycleon-rides: Ride Lifecycle Engine
//!
//! Owns the only two operations that move a bike out of or back into a
//! location: [`RideEngine::book_ride`] and [`RideEngine::end_ride`].
//!
//! ## Ride Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   book_ride(user, "Elm St", "Oak Ave", "B1")                            │
//! │     pre-checks: stops exist, no ride yet, balance ≥ minimum            │
//! │     ┌── transaction ──────────────────────────────────────────────┐     │
//! │     │ remove B1 from Elm St      (conditional delete, 1 winner)   │     │
//! │     │ set user's active ride     (slot keyed by user)             │     │
//! │     └─────────────────────────────────────────────────────────────┘     │
//! │                                                                         │
//! │   end_ride(user)                                                        │
//! │     read active ride, compute fare                                     │
//! │     ┌── transaction ──────────────────────────────────────────────┐     │
//! │     │ clear active ride by ride_id   (claim; loser = no ride)     │     │
//! │     │ dock B1 at Oak Ave                                          │     │
//! │     │ append ride record             (ride_id is primary key)     │     │
//! │     │ debit fare                     (single increment)           │     │
//! │     └─────────────────────────────────────────────────────────────┘     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A crash anywhere inside either transaction rolls all of it back, so a
//! bike is never both docked and on a ride, and a ride is charged once.

pub mod engine;
pub mod error;
pub mod policy;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use engine::{BookedRide, EndedRide, RideEngine};
pub use error::{RideError, RideResult};
pub use policy::RidePolicy;
