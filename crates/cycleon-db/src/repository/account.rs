//! # Account Repository
//!
//! The Account Store: balances and the one-ride-per-user slot.
//!
//! ## Balance Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Balance Update Strategy                          │
//! │                                                                     │
//! │  ❌ WRONG: Absolute update (loses concurrent changes)              │
//! │     UPDATE accounts SET balance_cents = 500 WHERE id = ?           │
//! │                                                                     │
//! │  ✅ CORRECT: Delta update                                          │
//! │     UPDATE accounts SET balance_cents = balance_cents - 1000       │
//! │                                                                     │
//! │  Top-up +2000 and fare -1000 arriving together always net +1000.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Active Ride Slot
//! `active_rides` is keyed by `user_id`. Claiming the slot is an insert that
//! does nothing when the key exists; releasing it is a delete keyed by the
//! ride id. Both report whether this call was the one that changed it.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cycleon_core::{Account, ActiveRide, Bike, Money, Stop};

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    username: String,
    balance_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn with_ride(self, active_ride: Option<ActiveRide>) -> Account {
        Account {
            id: self.id,
            username: self.username,
            balance_cents: self.balance_cents,
            active_ride,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ActiveRideRow {
    ride_id: String,
    bike_id: String,
    bike_name: String,
    bike_description: String,
    start_location_id: String,
    start_location_name: String,
    start_coordinates: String,
    end_location_id: String,
    end_location_name: String,
    end_coordinates: String,
    start_time: DateTime<Utc>,
}

impl From<ActiveRideRow> for ActiveRide {
    fn from(row: ActiveRideRow) -> Self {
        ActiveRide {
            ride_id: row.ride_id,
            bike: Bike {
                id: row.bike_id,
                name: row.bike_name,
                description: row.bike_description,
            },
            start: Stop {
                id: row.start_location_id,
                name: row.start_location_name,
                coordinates: row.start_coordinates,
            },
            end: Stop {
                id: row.end_location_id,
                name: row.end_location_name,
                coordinates: row.end_coordinates,
            },
            start_time: row.start_time,
        }
    }
}

/// Repository for rider accounts.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Provisions an account.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Username taken
    pub async fn create(&self, username: &str, opening_balance: Money) -> DbResult<Account> {
        debug!(username = %username, "Creating account");

        let now = Utc::now();
        let row = AccountRow {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            balance_cents: opening_balance.cents(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, balance_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&row.id)
        .bind(&row.username)
        .bind(row.balance_cents)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, username),
            other => other,
        })?;

        Ok(row.with_ride(None))
    }

    /// Gets an account, with its active ride, by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Account>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// Adds funds and returns the updated account.
    ///
    /// Same single-statement increment the ride engine uses for fares.
    pub async fn top_up(&self, id: &str, amount: Money) -> DbResult<Account> {
        debug!(user_id = %id, amount = %amount, "Topping up balance");

        let mut conn = self.pool.acquire().await?;
        Self::adjust_balance(&mut conn, id, amount).await?;
        Self::fetch(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Account", id))
    }

    /// Counts users currently on a ride.
    pub async fn count_active_rides(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM active_rides")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Connection Functions (compose inside a transaction)
    // =========================================================================

    /// Loads an account and its active ride.
    pub async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, username, balance_cents, created_at, updated_at
            FROM accounts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => {
                let ride = Self::fetch_active_ride(conn, id).await?;
                Ok(Some(row.with_ride(ride)))
            }
            None => Ok(None),
        }
    }

    /// Loads the user's active ride, if any.
    pub async fn fetch_active_ride(
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> DbResult<Option<ActiveRide>> {
        let row: Option<ActiveRideRow> = sqlx::query_as(
            r#"
            SELECT
                ride_id,
                bike_id, bike_name, bike_description,
                start_location_id, start_location_name, start_coordinates,
                end_location_id, end_location_name, end_coordinates,
                start_time
            FROM active_rides
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(ActiveRide::from))
    }

    /// Atomically claims the user's ride slot.
    ///
    /// ## Returns
    /// * `Ok(true)` - The ride is now the user's active ride
    /// * `Ok(false)` - The user already had one; nothing changed
    /// * `Err(DbError::UniqueViolation)` - The bike is already on another ride
    pub async fn set_active_ride(
        conn: &mut SqliteConnection,
        user_id: &str,
        ride: &ActiveRide,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO active_rides (
                user_id, ride_id,
                bike_id, bike_name, bike_description,
                start_location_id, start_location_name, start_coordinates,
                end_location_id, end_location_name, end_coordinates,
                start_time
            ) VALUES (
                ?1, ?2,
                ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11,
                ?12
            )
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&ride.ride_id)
        .bind(&ride.bike.id)
        .bind(&ride.bike.name)
        .bind(&ride.bike.description)
        .bind(&ride.start.id)
        .bind(&ride.start.name)
        .bind(&ride.start.coordinates)
        .bind(&ride.end.id)
        .bind(&ride.end.name)
        .bind(&ride.end.coordinates)
        .bind(ride.start_time)
        .execute(&mut *conn)
        .await?;

        let claimed = result.rows_affected() == 1;
        debug!(user_id = %user_id, ride_id = %ride.ride_id, claimed, "Set active ride");
        Ok(claimed)
    }

    /// Atomically releases the user's ride slot, if it still holds `ride_id`.
    ///
    /// ## Returns
    /// * `Ok(true)` - This call ended the ride
    /// * `Ok(false)` - The ride was already released
    pub async fn clear_active_ride(
        conn: &mut SqliteConnection,
        user_id: &str,
        ride_id: &str,
    ) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM active_rides WHERE user_id = ?1 AND ride_id = ?2")
            .bind(user_id)
            .bind(ride_id)
            .execute(&mut *conn)
            .await?;

        let cleared = result.rows_affected() == 1;
        debug!(user_id = %user_id, ride_id = %ride_id, cleared, "Clear active ride");
        Ok(cleared)
    }

    /// Atomically adds `delta` (negative to debit) and returns the new balance.
    ///
    /// The sum must stay within `i64`; SQLite would otherwise store it as a
    /// REAL. An out-of-range change writes nothing and fails with
    /// [`DbError::BalanceOutOfRange`].
    pub async fn adjust_balance(
        conn: &mut SqliteConnection,
        user_id: &str,
        delta: Money,
    ) -> DbResult<Money> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET balance_cents = balance_cents + ?1,
                updated_at = ?2
            WHERE id = ?3
              AND (?1 <= 0 OR balance_cents <= ?4 - ?1)
              AND (?1 >= 0 OR balance_cents >= ?5 - ?1)
            RETURNING balance_cents
            "#,
        )
        .bind(delta.cents())
        .bind(Utc::now())
        .bind(user_id)
        .bind(i64::MAX)
        .bind(i64::MIN)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(balance) = balance.map(Money::from_cents) else {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1)")
                .bind(user_id)
                .fetch_one(&mut *conn)
                .await?;
            if exists {
                warn!(user_id = %user_id, delta = %delta, "Balance change out of range");
                return Err(DbError::BalanceOutOfRange {
                    id: user_id.to_string(),
                });
            }
            return Err(DbError::not_found("Account", user_id));
        };

        debug!(user_id = %user_id, delta = %delta, balance = %balance, "Adjusted balance");
        Ok(balance)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn sample_ride(ride_id: &str, bike_id: &str) -> ActiveRide {
        let stop = Stop {
            id: "loc-1".to_string(),
            name: "Elm St".to_string(),
            coordinates: "1,1".to_string(),
        };
        ActiveRide {
            ride_id: ride_id.to_string(),
            bike: Bike {
                id: bike_id.to_string(),
                name: "Roadster".to_string(),
                description: "Blue city bike".to_string(),
            },
            start: stop.clone(),
            end: stop,
            start_time: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let created = db.accounts().create("alice", Money::from_cents(1500)).await.unwrap();

        let account = db.accounts().get(&created.id).await.unwrap().unwrap();
        assert_eq!(account.username, "alice");
        assert_eq!(account.balance(), Money::from_cents(1500));
        assert!(account.active_ride.is_none());

        assert!(db.accounts().get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.accounts().create("alice", Money::zero()).await.unwrap();

        let err = db.accounts().create("alice", Money::zero()).await.unwrap_err();
        assert!(err.is_duplicate_of("accounts.username"));
    }

    #[tokio::test]
    async fn test_top_up_and_debit_are_increments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let alice = db.accounts().create("alice", Money::from_cents(500)).await.unwrap();

        let account = db.accounts().top_up(&alice.id, Money::from_cents(2000)).await.unwrap();
        assert_eq!(account.balance_cents, 2500);

        let mut conn = db.pool().acquire().await.unwrap();
        let balance = AccountRepository::adjust_balance(&mut conn, &alice.id, Money::from_cents(-3000))
            .await
            .unwrap();
        assert_eq!(balance.cents(), -500);

        let err = AccountRepository::adjust_balance(&mut conn, "missing", Money::from_cents(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_top_up_past_integer_range_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let alice = db.accounts().create("alice", Money::zero()).await.unwrap();
        let huge = Money::from_cents(9_000_000_000_000_000_000);

        let account = db.accounts().top_up(&alice.id, huge).await.unwrap();
        assert_eq!(account.balance_cents, 9_000_000_000_000_000_000);

        let err = db.accounts().top_up(&alice.id, huge).await.unwrap_err();
        assert!(matches!(err, DbError::BalanceOutOfRange { .. }));

        // still an INTEGER column, so the account reads back
        let account = db.accounts().get(&alice.id).await.unwrap().unwrap();
        assert_eq!(account.balance_cents, 9_000_000_000_000_000_000);

        let mut conn = db.pool().acquire().await.unwrap();
        let balance = AccountRepository::adjust_balance(&mut conn, &alice.id, Money::from_cents(i64::MIN))
            .await
            .unwrap();
        assert_eq!(balance.cents(), 9_000_000_000_000_000_000 + i64::MIN);

        let err = AccountRepository::adjust_balance(&mut conn, &alice.id, Money::from_cents(i64::MIN))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::BalanceOutOfRange { .. }));
    }

    #[tokio::test]
    async fn test_ride_slot_holds_one_ride() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let alice = db.accounts().create("alice", Money::zero()).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let first = sample_ride("ride-1", "B1");
        assert!(AccountRepository::set_active_ride(&mut conn, &alice.id, &first).await.unwrap());
        assert!(!AccountRepository::set_active_ride(&mut conn, &alice.id, &sample_ride("ride-2", "B2"))
            .await
            .unwrap());

        let stored = AccountRepository::fetch_active_ride(&mut conn, &alice.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.ride_id, "ride-1");
        assert_eq!(stored.bike, first.bike);
        assert_eq!(stored.end.name, "Elm St");
    }

    #[tokio::test]
    async fn test_bike_cannot_ride_twice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let alice = db.accounts().create("alice", Money::zero()).await.unwrap();
        let bob = db.accounts().create("bob", Money::zero()).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        AccountRepository::set_active_ride(&mut conn, &alice.id, &sample_ride("ride-1", "B1"))
            .await
            .unwrap();
        let err = AccountRepository::set_active_ride(&mut conn, &bob.id, &sample_ride("ride-2", "B1"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of("active_rides.bike_id"));
    }

    #[tokio::test]
    async fn test_clear_only_matches_the_ride_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let alice = db.accounts().create("alice", Money::zero()).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        AccountRepository::set_active_ride(&mut conn, &alice.id, &sample_ride("ride-1", "B1"))
            .await
            .unwrap();

        assert!(!AccountRepository::clear_active_ride(&mut conn, &alice.id, "ride-0").await.unwrap());
        assert!(AccountRepository::clear_active_ride(&mut conn, &alice.id, "ride-1").await.unwrap());
        assert!(!AccountRepository::clear_active_ride(&mut conn, &alice.id, "ride-1").await.unwrap());
        drop(conn);

        assert_eq!(db.accounts().count_active_rides().await.unwrap(), 0);
    }
}
