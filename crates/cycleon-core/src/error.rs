//! # Error Types
//!
//! Domain-specific error types for cycleon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cycleon-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cycleon-db errors                                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  cycleon-rides errors                                                  │
//! │  └── RideError        - CoreError or DbError, nothing else             │
//! │                                                                         │
//! │  HTTP errors (in app)                                                  │
//! │  └── ApiError         - {"errors":[{"msg": ...}]} + status code        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is a normal business outcome. The API layer answers
//! them with a 400 and never treats them as crashes.

use thiserror::Error;

use crate::money::Money;
use crate::types::StopRole;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A start or end location named in a ride request does not exist.
    #[error("{role} location with the name {name} does not exist")]
    StopNotFound { role: StopRole, name: String },

    /// A location named in an admin request does not exist.
    #[error("Location with the name {0} does not exist")]
    LocationNotFound(String),

    /// The account behind a verified identity is gone.
    #[error("User {0} does not exist")]
    AccountNotFound(String),

    /// The user already holds a bike.
    #[error("User Already has an active ride.")]
    RideInProgress,

    /// The bike left the location before this request could take it.
    ///
    /// ## When This Occurs
    /// ```text
    /// Request A ──► reads Elm St: [B1] ──► removes B1 ✓ ──► ride booked
    /// Request B ──► reads Elm St: [B1] ──► removes B1 ✗ ──► BikeUnavailable
    /// ```
    #[error("Bike is not at this location anymore. Please select another bike.")]
    BikeUnavailable { bike_id: String },

    /// Balance is below the booking threshold.
    #[error("Insufficient funds: balance is {balance}, at least {required} is required to book a ride")]
    InsufficientFunds { balance: Money, required: Money },

    /// End-ride was requested without a ride in progress.
    #[error("User has no active rides")]
    NoActiveRide,

    /// Admin tried to delete a bike that is not at the location.
    #[error("Bike does not exist")]
    BikeNotFound { bike_id: String },

    /// Another location already uses these coordinates.
    #[error("Location with these coordinates exists")]
    DuplicateCoordinates(String),

    /// Another location already uses this name.
    #[error("Location with this name exists")]
    DuplicateLocationName(String),

    /// Applying the amount would take the balance outside what the
    /// account can hold.
    #[error("Balance limit exceeded")]
    BalanceLimitExceeded,

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any business logic runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Amount is above the allowed maximum.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: Money },

    /// Invalid format (e.g., an amount with three decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
