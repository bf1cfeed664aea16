//! # Validation Module
//!
//! Request field rules checked before the ride engine or a store sees them.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler                                                 │
//! │  ├── JSON deserialization (types)                                      │
//! │  └── THIS MODULE: field rules, every failure collected                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ride engine / repositories                                   │
//! │  └── "not found", "taken", "no funds" as business outcomes             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY / UNIQUE (one ride per user, one place per bike)      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cycleon_core::validation::{validate_bike_id, validate_location_name};
//!
//! assert!(validate_location_name("locationName", "Elm St").is_ok());
//! assert!(validate_location_name("locationName", "Elm").is_err());
//! assert!(validate_bike_id("").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_TOP_UP_CENTS, MIN_BIKE_DESCRIPTION_LEN, MIN_BIKE_NAME_LEN, MIN_LOCATION_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound for every free-text field.
pub const MAX_TEXT_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, min: usize) -> ValidationResult<()> {
    let value = value.trim();
    let len = value.chars().count();

    if len == 0 {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    if len > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates a location name.
///
/// `field` is the request field being checked, so the message names it
/// (`startLocationName`, `endLocationName`, `locationName`).
///
/// ## Rules
/// - At least 4 characters after trimming
pub fn validate_location_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_text(field, name, MIN_LOCATION_NAME_LEN)
}

/// Validates a bike id. Any non-empty string is accepted; unknown ids are
/// a business outcome, not a validation failure.
pub fn validate_bike_id(bike_id: &str) -> ValidationResult<()> {
    validate_text("bikeId", bike_id, 1)
}

/// Validates a bike name (at least 2 characters).
pub fn validate_bike_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, MIN_BIKE_NAME_LEN)
}

/// Validates a bike description (at least 10 characters).
pub fn validate_bike_description(description: &str) -> ValidationResult<()> {
    validate_text("description", description, MIN_BIKE_DESCRIPTION_LEN)
}

/// Validates location coordinates. The format is free-form; only emptiness
/// is rejected.
pub fn validate_coordinates(coordinates: &str) -> ValidationResult<()> {
    validate_text("coordinates", coordinates, 1)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a balance top-up.
///
/// ## Rules
/// - Must be greater than zero
/// - At most 10,000.00 per top-up
///
/// ## Example
/// ```rust
/// use cycleon_core::money::Money;
/// use cycleon_core::validation::validate_top_up;
///
/// assert!(validate_top_up(Money::from_cents(500)).is_ok());
/// assert!(validate_top_up(Money::zero()).is_err());
/// assert!(validate_top_up(Money::from_cents(1_000_001)).is_err());
/// ```
pub fn validate_top_up(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "valueToAdd".to_string(),
        });
    }
    let max = Money::from_cents(MAX_TOP_UP_CENTS);
    if amount > max {
        return Err(ValidationError::TooLarge {
            field: "valueToAdd".to_string(),
            max,
        });
    }

    Ok(())
}

/// Collects every failure from a batch of checks.
///
/// ## Example
/// ```rust
/// use cycleon_core::validation::{collect, validate_bike_id, validate_location_name};
///
/// let errors = collect([
///     validate_location_name("startLocationName", "Elm St"),
///     validate_location_name("endLocationName", "Oak"),
///     validate_bike_id(""),
/// ]);
/// assert_eq!(errors.len(), 2);
/// ```
pub fn collect<I>(checks: I) -> Vec<ValidationError>
where
    I: IntoIterator<Item = ValidationResult<()>>,
{
    checks.into_iter().filter_map(Result::err).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
