//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use cycleon_core::{FareRate, Money, DEFAULT_FARE_RATE_CENTS_PER_HOUR, MIN_BOOKING_BALANCE_CENTS};
use cycleon_db::DbConfig;
use cycleon_rides::RidePolicy;

/// Development-only signing key. Set `JWT_SECRET` in any real deployment.
const DEV_JWT_SECRET: &str = "cycleon-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Upper bound on pooled connections
    pub database_max_connections: u32,

    /// HS256 key for `x-auth-token`
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Ride price per hour, in cents
    pub fare_rate_cents_per_hour: i64,

    /// Balance needed to book a ride, in cents
    pub min_booking_balance_cents: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            port: var_or("PORT", "5000")?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./cycleon.db".to_string()),

            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", "5")?,

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),

            jwt_lifetime_secs: var_or("JWT_LIFETIME_SECS", "3600")?, // 1 hour

            fare_rate_cents_per_hour: var_or(
                "FARE_RATE_CENTS_PER_HOUR",
                &DEFAULT_FARE_RATE_CENTS_PER_HOUR.to_string(),
            )?,

            min_booking_balance_cents: var_or(
                "MIN_BOOKING_BALANCE_CENTS",
                &MIN_BOOKING_BALANCE_CENTS.to_string(),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        if self.fare_rate_cents_per_hour < 0 {
            return Err(ConfigError::InvalidValue("FARE_RATE_CENTS_PER_HOUR".to_string()));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        Ok(())
    }

    /// Database settings for [`cycleon_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.database_max_connections)
    }

    /// Pricing handed to the ride engine.
    pub fn ride_policy(&self) -> RidePolicy {
        RidePolicy::new(
            FareRate::from_cents_per_hour(self.fare_rate_cents_per_hour),
            Money::from_cents(self.min_booking_balance_cents),
        )
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn var_or<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ApiConfig {
        ApiConfig {
            port: 5000,
            database_path: "./cycleon.db".to_string(),
            database_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_lifetime_secs: 3600,
            fare_rate_cents_per_hour: 1000,
            min_booking_balance_cents: 1000,
        }
    }

    #[test]
    fn test_policy_from_config() {
        let policy = sample().ride_policy();
        assert_eq!(policy.fare_rate.cents_per_hour(), 1000);
        assert_eq!(policy.min_booking_balance, Money::from_cents(1000));
        assert_eq!(policy, RidePolicy::default());
    }

    #[test]
    fn test_validate_rejects_nonsense() {
        assert!(sample().validate().is_ok());
        assert!(sample().uses_dev_secret());

        let mut config = sample();
        config.database_max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.jwt_lifetime_secs = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.jwt_secret.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));
    }

    #[test]
    fn test_db_config_uses_path_and_pool_size() {
        let db = sample().db_config();
        assert_eq!(db.max_connections, 5);
        assert!(!db.is_in_memory());
    }
}
