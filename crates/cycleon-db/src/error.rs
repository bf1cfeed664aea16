//! # Database Errors
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← constraint failures get their own variants    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RideError::Store / ApiError ← Logged, answered with "Server Error"    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `UniqueViolation` is the one variant callers routinely inspect: it is how
//! an admin learns a location name or coordinates are already taken.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Everything a store call can fail with.
#[derive(Debug, Error)]
pub enum DbError {
    /// A row the caller required is missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `field` is `table.column` as SQLite names it, e.g.
    /// `locations.coordinates`.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A bike docked at, or a ride recorded for, a row that is gone.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The balance change would overflow the account's integer balance.
    /// Nothing was written.
    #[error("Balance out of range for account {id}")]
    BalanceOutOfRange { id: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected the statement for any other reason (including
    /// `SQLITE_BUSY` after the busy timeout).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No connection came free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Checks for a unique violation on the given `table.column`.
    pub fn is_duplicate_of(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field == column)
    }
}

/// ```text
/// RowNotFound                      → NotFound
/// Database(kind = UniqueViolation) → UniqueViolation { field: table.column }
/// Database(kind = ForeignKey…)     → ForeignKeyViolation
/// Database(anything else)          → QueryFailed
/// PoolTimedOut                     → PoolExhausted
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                match db_err.kind() {
                    // "UNIQUE constraint failed: <table>.<column>"; the
                    // caller fills in the value.
                    ErrorKind::UniqueViolation => {
                        let field = msg.strip_prefix("UNIQUE constraint failed: ").unwrap_or(msg);
                        DbError::duplicate(field, "unknown")
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    },
                    _ => DbError::QueryFailed(msg.to_string()),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_duplicate_of() {
        let err = DbError::duplicate("locations.name", "Elm St");
        assert!(err.is_duplicate_of("locations.name"));
        assert!(!err.is_duplicate_of("locations.coordinates"));
        assert!(!DbError::PoolExhausted.is_duplicate_of("locations.name"));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
