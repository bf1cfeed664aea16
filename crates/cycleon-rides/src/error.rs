//! # Ride Error Types

use thiserror::Error;

use cycleon_core::CoreError;
use cycleon_db::DbError;

/// Result type alias for ride operations.
pub type RideResult<T> = Result<T, RideError>;

/// A ride operation either broke a business rule or the store failed.
///
/// ## Handling
/// - `Rule`: a normal outcome, shown to the rider as-is
/// - `Store`: logged, never retried here, reported as a server error
#[derive(Debug, Error)]
pub enum RideError {
    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl RideError {
    /// Checks if this is a business-rule violation.
    pub fn is_rule(&self) -> bool {
        matches!(self, RideError::Rule(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_errors_keep_their_message() {
        let err: RideError = CoreError::NoActiveRide.into();
        assert!(err.is_rule());
        assert_eq!(err.to_string(), "User has no active rides");

        let err: RideError = DbError::PoolExhausted.into();
        assert!(!err.is_rule());
    }
}
