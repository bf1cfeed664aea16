//! # Ride Engine
//!
//! Books and ends rides against the inventory, account and ledger stores.
//!
//! ## Pre-checks vs. the Transaction
//! Everything read before `begin()` is advisory. The transaction re-decides
//! each contested fact with a conditional write whose row count is the
//! answer:
//!
//! ```text
//! pre-check says         conditional write              loser sees
//! ───────────────        ─────────────────────────      ───────────────
//! B1 is docked     ──►   DELETE location_bikes …  = 0   BikeUnavailable
//! no active ride   ──►   INSERT … ON CONFLICT     = 0   RideInProgress
//! ride R is active ──►   DELETE active_rides R    = 0   NoActiveRide
//! ```
//!
//! The first statement of every transaction is a write, so SQLite hands out
//! the write lock before any row is read inside it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use cycleon_core::fare::fare_between;
use cycleon_core::{Account, ActiveRide, CoreError, Location, Money, RideRecord, StopRole};
use cycleon_db::{AccountRepository, Database, DbError, LocationRepository, RideHistoryRepository};

use crate::error::RideResult;
use crate::policy::RidePolicy;

// =============================================================================
// Results
// =============================================================================

/// State after a successful booking.
#[derive(Debug, Clone)]
pub struct BookedRide {
    /// The start location, without the booked bike.
    pub location: Location,

    /// The rider, now holding the ride.
    pub account: Account,
}

/// State after a successful return.
#[derive(Debug, Clone)]
pub struct EndedRide {
    /// The location the bike was returned to.
    pub location: Location,

    /// The rider, charged and with no active ride.
    pub account: Account,

    /// The ledger entry just written.
    pub ride: RideRecord,
}

// =============================================================================
// Engine
// =============================================================================

/// Ride lifecycle orchestrator.
///
/// Cheap to clone: the database handle and clock are shared.
#[derive(Clone)]
pub struct RideEngine {
    db: Database,
    clock: Arc<dyn Clock>,
    policy: RidePolicy,
}

impl std::fmt::Debug for RideEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RideEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RideEngine {
    pub fn new(db: Database, clock: Arc<dyn Clock>, policy: RidePolicy) -> Self {
        RideEngine { db, clock, policy }
    }

    pub fn policy(&self) -> &RidePolicy {
        &self.policy
    }

    /// Checks a bike out of `start_name` for `user_id`, to be returned at
    /// `end_name`.
    ///
    /// ## Errors
    /// Checked in this order, each a [`CoreError`]:
    /// 1. `StopNotFound` - start, then end, location does not exist
    /// 2. `AccountNotFound` - no account behind the identity
    /// 3. `RideInProgress` - the user already holds a bike
    /// 4. `InsufficientFunds` - balance below the policy minimum
    /// 5. `BikeUnavailable` - the bike is not docked at the start location,
    ///    or another booking took it first
    ///
    /// Nothing is written unless every check passes.
    pub async fn book_ride(
        &self,
        user_id: &str,
        start_name: &str,
        end_name: &str,
        bike_id: &str,
    ) -> RideResult<BookedRide> {
        debug!(
            user_id = %user_id,
            start = %start_name,
            end = %end_name,
            bike_id = %bike_id,
            "Booking ride"
        );

        let start = self.resolve_stop(StopRole::Start, start_name).await?;
        let end = if end_name == start_name {
            start.clone()
        } else {
            self.resolve_stop(StopRole::End, end_name).await?
        };

        let account = self
            .db
            .accounts()
            .get(user_id)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(user_id.to_string()))?;

        if account.has_active_ride() {
            return Err(CoreError::RideInProgress.into());
        }

        let required = self.policy.min_booking_balance;
        if account.balance() < required {
            debug!(user_id = %user_id, balance = %account.balance(), "Balance below booking minimum");
            return Err(CoreError::InsufficientFunds {
                balance: account.balance(),
                required,
            }
            .into());
        }

        let bike = start.bike(bike_id).cloned().ok_or_else(|| {
            debug!(bike_id = %bike_id, location = %start.name, "Bike not in location snapshot");
            CoreError::BikeUnavailable {
                bike_id: bike_id.to_string(),
            }
        })?;

        let ride = ActiveRide {
            ride_id: Uuid::new_v4().to_string(),
            bike,
            start: start.stop(),
            end: end.stop(),
            start_time: self.clock.utc(),
        };

        let mut tx = self.db.begin().await?;

        if !LocationRepository::remove_bike(&mut tx, &start.id, bike_id).await? {
            warn!(user_id = %user_id, bike_id = %bike_id, "Lost checkout race");
            return Err(CoreError::BikeUnavailable {
                bike_id: bike_id.to_string(),
            }
            .into());
        }

        if !AccountRepository::set_active_ride(&mut tx, user_id, &ride).await? {
            // A concurrent booking by the same user got there first; the
            // rollback puts the bike back.
            tx.rollback().await.map_err(DbError::from)?;
            warn!(user_id = %user_id, bike_id = %bike_id, "Concurrent booking for the same user");
            return Err(CoreError::RideInProgress.into());
        }

        let location = LocationRepository::fetch_by_id(&mut tx, &start.id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", &start.id))?;
        let account = AccountRepository::fetch(&mut tx, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Account", user_id))?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            user_id = %user_id,
            ride_id = %ride.ride_id,
            bike_id = %bike_id,
            start = %ride.start.name,
            end = %ride.end.name,
            "Ride booked"
        );

        Ok(BookedRide { location, account })
    }

    /// Returns the user's bike to the end location declared at booking,
    /// records the ride and charges the fare.
    ///
    /// ## Balance
    /// The fare is debited in full even when it exceeds the balance; the
    /// minimum-funds check happens at booking only, so a long ride can leave
    /// the balance negative.
    ///
    /// ## Retries
    /// The ride's `ride_id` is claimed before anything else is written. A
    /// retried or concurrent call for a ride that has already been settled
    /// fails with `NoActiveRide` and changes nothing.
    ///
    /// ## Errors
    /// - `AccountNotFound` - no account behind the identity
    /// - `NoActiveRide` - nothing to end (or already ended)
    /// - `StopNotFound` (End) - the declared end location no longer exists;
    ///   the ride stays active until a location with that name exists again
    pub async fn end_ride(&self, user_id: &str) -> RideResult<EndedRide> {
        debug!(user_id = %user_id, "Ending ride");

        let account = self
            .db
            .accounts()
            .get(user_id)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(user_id.to_string()))?;

        let mut ride = account.active_ride.ok_or(CoreError::NoActiveRide)?;

        let end_time = self.clock.utc();
        let fare = self.fare(ride.start_time, end_time);

        let mut tx = self.db.begin().await?;

        if !AccountRepository::clear_active_ride(&mut tx, user_id, &ride.ride_id).await? {
            warn!(user_id = %user_id, ride_id = %ride.ride_id, "Ride already ended");
            return Err(CoreError::NoActiveRide.into());
        }

        let end_location = match LocationRepository::fetch_by_id(&mut tx, &ride.end.id).await? {
            Some(location) => location,
            // Deleted and re-created under the same name
            None => LocationRepository::fetch_by_name(&mut tx, &ride.end.name)
                .await?
                .ok_or_else(|| CoreError::StopNotFound {
                    role: StopRole::End,
                    name: ride.end.name.clone(),
                })?,
        };
        ride.end = end_location.stop();

        LocationRepository::add_bike(&mut tx, &end_location.id, &ride.bike).await?;

        let record = ride.finish(user_id, end_time, fare);
        RideHistoryRepository::append(&mut tx, &record).await?;

        let balance = AccountRepository::adjust_balance(&mut tx, user_id, -fare).await?;

        let location = LocationRepository::fetch_by_id(&mut tx, &end_location.id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", &end_location.id))?;
        let account = AccountRepository::fetch(&mut tx, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Account", user_id))?;

        tx.commit().await.map_err(DbError::from)?;

        if balance.is_negative() {
            warn!(user_id = %user_id, balance = %balance, "Ride left balance negative");
        }

        info!(
            user_id = %user_id,
            ride_id = %record.ride_id,
            bike_id = %record.bike.id,
            end = %record.end.name,
            fare = %fare,
            balance = %balance,
            "Ride ended"
        );

        Ok(EndedRide {
            location,
            account,
            ride: record,
        })
    }

    fn fare(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Money {
        fare_between(start, end, self.policy.fare_rate)
    }

    async fn resolve_stop(&self, role: StopRole, name: &str) -> RideResult<Location> {
        let location = self
            .db
            .locations()
            .find_by_name(name)
            .await?
            .ok_or_else(|| CoreError::StopNotFound {
                role,
                name: name.to_string(),
            })?;

        Ok(location)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RideError;
    use crate::testing::ManualClock;
    use chrono::Duration;
    use cycleon_core::Bike;
    use cycleon_db::DbConfig;

    struct Harness {
        db: Database,
        clock: Arc<ManualClock>,
        engine: RideEngine,
        elm: Location,
    }

    impl Harness {
        async fn new() -> Self {
            Self::with_config(DbConfig::in_memory()).await
        }

        async fn with_config(config: DbConfig) -> Self {
            let db = Database::new(config).await.unwrap();
            let clock = Arc::new(ManualClock::default());
            let engine = RideEngine::new(db.clone(), clock.clone(), RidePolicy::default());
            let elm = db.locations().create("Elm St", "40.71,-74.00").await.unwrap();

            let harness = Harness {
                db,
                clock,
                engine,
                elm,
            };
            harness.dock("Elm St", "B1").await;
            harness
        }

        async fn dock(&self, location_name: &str, bike_id: &str) {
            let location = self
                .db
                .locations()
                .find_by_name(location_name)
                .await
                .unwrap()
                .unwrap();
            let bike = Bike {
                id: bike_id.to_string(),
                name: format!("Bike {bike_id}"),
                description: "Standard city bike".to_string(),
            };
            let mut conn = self.db.pool().acquire().await.unwrap();
            LocationRepository::add_bike(&mut conn, &location.id, &bike)
                .await
                .unwrap();
        }

        async fn rider(&self, username: &str, balance_cents: i64) -> String {
            self.db
                .accounts()
                .create(username, Money::from_cents(balance_cents))
                .await
                .unwrap()
                .id
        }

        async fn balance(&self, user_id: &str) -> i64 {
            self.db.accounts().get(user_id).await.unwrap().unwrap().balance_cents
        }

        async fn bikes_at(&self, name: &str) -> Vec<String> {
            self.db
                .locations()
                .find_by_name(name)
                .await
                .unwrap()
                .unwrap()
                .bikes
                .into_iter()
                .map(|b| b.id)
                .collect()
        }

        async fn docked(&self) -> i64 {
            self.db.locations().count_docked_bikes().await.unwrap()
        }

        async fn riding(&self) -> i64 {
            self.db.accounts().count_active_rides().await.unwrap()
        }

        async fn history_len(&self, user_id: &str) -> i64 {
            self.db.ride_history().count_for_user(user_id).await.unwrap()
        }
    }

    fn assert_rule(err: RideError, expected: fn(&CoreError) -> bool) {
        match err {
            RideError::Rule(ref core) if expected(core) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_elm_street_round_trip() {
        let h = Harness::new().await;
        let user = h.rider("alice", 1500).await;

        let booked = h.engine.book_ride(&user, "Elm St", "Elm St", "B1").await.unwrap();
        let active = booked.account.active_ride.clone().unwrap();
        assert_eq!(active.bike_id(), "B1");
        assert!(!booked.location.has_bike("B1"));
        assert!(h.bikes_at("Elm St").await.is_empty());

        h.clock.advance(Duration::hours(1));

        let ended = h.engine.end_ride(&user).await.unwrap();
        assert_eq!(ended.ride.fare(), Money::from_cents(1000));
        assert_eq!(ended.ride.fare().to_string(), "10.00");
        assert_eq!(ended.account.balance().to_string(), "5.00");
        assert!(ended.account.active_ride.is_none());
        assert!(ended.location.has_bike("B1"));
        assert_eq!(h.bikes_at("Elm St").await, vec!["B1".to_string()]);
        assert_eq!(h.history_len(&user).await, 1);

        let history = h.db.ride_history().list_for_user(&user).await.unwrap();
        assert_eq!(history[0].ride_id, active.ride_id);
        assert_eq!(history[0].end_time - history[0].start_time, Duration::hours(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pooled_file_database_books_one_bike_once() {
        const RIDERS: usize = 16;

        let dir = tempfile::tempdir().unwrap();
        let h = Harness::with_config(DbConfig::new(dir.path().join("rides.db")).max_connections(8)).await;
        let mut riders = Vec::with_capacity(RIDERS);
        for i in 0..RIDERS {
            riders.push(h.rider(&format!("rider{i}"), 1500).await);
        }

        let tasks: Vec<_> = riders
            .iter()
            .map(|user| {
                let engine = h.engine.clone();
                let user = user.clone();
                tokio::spawn(async move { engine.book_ride(&user, "Elm St", "Elm St", "B1").await })
            })
            .collect();

        let mut booked = 0;
        let mut unavailable = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => booked += 1,
                Err(RideError::Rule(CoreError::BikeUnavailable { .. })) => unavailable += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(booked, 1);
        assert_eq!(unavailable, RIDERS - 1);
        assert_eq!(h.riding().await, 1);
        assert_eq!(h.docked().await, 0);
        h.db.close().await;
    }

    #[tokio::test]
    async fn test_bike_returns_to_declared_end_location() {
        let h = Harness::new().await;
        h.db.locations().create("Oak Ave", "40.72,-74.01").await.unwrap();
        let user = h.rider("alice", 1500).await;

        h.engine.book_ride(&user, "Elm St", "Oak Ave", "B1").await.unwrap();
        h.clock.advance(Duration::minutes(30));
        let ended = h.engine.end_ride(&user).await.unwrap();

        assert_eq!(ended.location.name, "Oak Ave");
        assert_eq!(ended.ride.start.name, "Elm St");
        assert_eq!(ended.ride.end.name, "Oak Ave");
        assert_eq!(ended.ride.fare_cents, 500);
        assert!(h.bikes_at("Elm St").await.is_empty());
        assert_eq!(h.bikes_at("Oak Ave").await, vec!["B1".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_bookings_of_one_bike_have_one_winner() {
        let h = Harness::new().await;
        h.dock("Elm St", "B2").await;
        let alice = h.rider("alice", 1500).await;
        let bob = h.rider("bob", 1500).await;
        let docked_before = h.docked().await;

        let (a, b) = tokio::join!(
            h.engine.book_ride(&alice, "Elm St", "Elm St", "B1"),
            h.engine.book_ride(&bob, "Elm St", "Elm St", "B1"),
        );

        let (winner, loser) = match (a, b) {
            (Ok(w), Err(l)) | (Err(l), Ok(w)) => (w, l),
            (a, b) => panic!("expected exactly one winner, got {a:?} and {b:?}"),
        };
        assert_eq!(winner.account.active_ride.unwrap().bike_id(), "B1");
        assert_rule(loser, |e| matches!(e, CoreError::BikeUnavailable { .. }));

        assert_eq!(h.docked().await, docked_before - 1);
        assert_eq!(h.riding().await, 1);
        assert_eq!(h.bikes_at("Elm St").await, vec!["B2".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_bookings_by_one_user_take_one_bike() {
        let h = Harness::new().await;
        h.dock("Elm St", "B2").await;
        let alice = h.rider("alice", 1500).await;

        let (a, b) = tokio::join!(
            h.engine.book_ride(&alice, "Elm St", "Elm St", "B1"),
            h.engine.book_ride(&alice, "Elm St", "Elm St", "B2"),
        );

        let loser = match (a, b) {
            (Ok(_), Err(l)) | (Err(l), Ok(_)) => l,
            (a, b) => panic!("expected exactly one winner, got {a:?} and {b:?}"),
        };
        assert_rule(loser, |e| matches!(e, CoreError::RideInProgress));

        // The losing bike is still docked
        assert_eq!(h.docked().await, 1);
        assert_eq!(h.riding().await, 1);
    }

    #[tokio::test]
    async fn test_second_booking_is_rejected() {
        let h = Harness::new().await;
        h.dock("Elm St", "B2").await;
        let user = h.rider("alice", 5000).await;

        h.engine.book_ride(&user, "Elm St", "Elm St", "B1").await.unwrap();
        let err = h.engine.book_ride(&user, "Elm St", "Elm St", "B2").await.unwrap_err();

        assert_rule(err, |e| matches!(e, CoreError::RideInProgress));
        assert_eq!(h.bikes_at("Elm St").await, vec!["B2".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_locations_are_named() {
        let h = Harness::new().await;
        let user = h.rider("alice", 1500).await;

        let err = h.engine.book_ride(&user, "Nowhere", "Elm St", "B1").await.unwrap_err();
        assert_eq!(err.to_string(), "Start location with the name Nowhere does not exist");

        let err = h.engine.book_ride(&user, "Elm St", "Nowhere", "B1").await.unwrap_err();
        assert_eq!(err.to_string(), "End location with the name Nowhere does not exist");

        assert_eq!(h.bikes_at("Elm St").await, vec!["B1".to_string()]);
    }

    #[tokio::test]
    async fn test_bike_not_at_start_location() {
        let h = Harness::new().await;
        h.db.locations().create("Oak Ave", "1,1").await.unwrap();
        h.dock("Oak Ave", "B7").await;
        let user = h.rider("alice", 1500).await;

        let err = h.engine.book_ride(&user, "Elm St", "Elm St", "B7").await.unwrap_err();
        assert_rule(err, |e| matches!(e, CoreError::BikeUnavailable { .. }));

        let err = h.engine.book_ride(&user, "Elm St", "Elm St", "nope").await.unwrap_err();
        assert_rule(err, |e| matches!(e, CoreError::BikeUnavailable { .. }));

        assert_eq!(h.riding().await, 0);
        assert_eq!(h.docked().await, 2);
    }

    #[tokio::test]
    async fn test_insufficient_funds_until_topped_up() {
        let h = Harness::new().await;
        let user = h.rider("alice", 999).await;

        for _ in 0..3 {
            let err = h.engine.book_ride(&user, "Elm St", "Elm St", "B1").await.unwrap_err();
            assert_rule(err, |e| matches!(e, CoreError::InsufficientFunds { .. }));
        }
        assert_eq!(h.bikes_at("Elm St").await, vec!["B1".to_string()]);
        assert_eq!(h.balance(&user).await, 999);

        h.db.accounts().top_up(&user, Money::from_cents(1)).await.unwrap();
        h.engine.book_ride(&user, "Elm St", "Elm St", "B1").await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let h = Harness::new().await;

        let err = h.engine.book_ride("ghost", "Elm St", "Elm St", "B1").await.unwrap_err();
        assert_rule(err, |e| matches!(e, CoreError::AccountNotFound(_)));

        let err = h.engine.end_ride("ghost").await.unwrap_err();
        assert_rule(err, |e| matches!(e, CoreError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_end_without_ride_changes_nothing() {
        let h = Harness::new().await;
        let user = h.rider("alice", 1500).await;

        let err = h.engine.end_ride(&user).await.unwrap_err();
        assert_rule(err, |e| matches!(e, CoreError::NoActiveRide));

        assert_eq!(h.balance(&user).await, 1500);
        assert_eq!(h.bikes_at("Elm St").await, vec!["B1".to_string()]);
        assert_eq!(h.history_len(&user).await, 0);
    }

    #[tokio::test]
    async fn test_retried_end_ride_charges_once() {
        let h = Harness::new().await;
        let user = h.rider("alice", 1500).await;

        h.engine.book_ride(&user, "Elm St", "Elm St", "B1").await.unwrap();
        h.clock.advance(Duration::hours(1));
        h.engine.end_ride(&user).await.unwrap();

        let err = h.engine.end_ride(&user).await.unwrap_err();
        assert_rule(err, |e| matches!(e, CoreError::NoActiveRide));

        assert_eq!(h.balance(&user).await, 500);
        assert_eq!(h.history_len(&user).await, 1);
        assert_eq!(h.bikes_at("Elm St").await, vec!["B1".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_end_ride_settles_once() {
        let h = Harness::new().await;
        let user = h.rider("alice", 1500).await;

        h.engine.book_ride(&user, "Elm St", "Elm St", "B1").await.unwrap();
        h.clock.advance(Duration::hours(1));

        let (a, b) = tokio::join!(h.engine.end_ride(&user), h.engine.end_ride(&user));
        let loser = match (a, b) {
            (Ok(_), Err(l)) | (Err(l), Ok(_)) => l,
            (a, b) => panic!("expected exactly one settlement, got {a:?} and {b:?}"),
        };
        assert_rule(loser, |e| matches!(e, CoreError::NoActiveRide));

        assert_eq!(h.balance(&user).await, 500);
        assert_eq!(h.history_len(&user).await, 1);
        assert_eq!(h.docked().await, 1);
    }

    #[tokio::test]
    async fn test_long_ride_can_leave_balance_negative() {
        let h = Harness::new().await;
        let user = h.rider("alice", 1000).await;

        h.engine.book_ride(&user, "Elm St", "Elm St", "B1").await.unwrap();
        h.clock.advance(Duration::hours(3));
        let ended = h.engine.end_ride(&user).await.unwrap();

        assert_eq!(ended.ride.fare_cents, 3000);
        assert_eq!(ended.account.balance_cents, -2000);

        let err = h.engine.book_ride(&user, "Elm St", "Elm St", "B1").await.unwrap_err();
        assert_rule(err, |e| matches!(e, CoreError::InsufficientFunds { .. }));
    }

    #[tokio::test]
    async fn test_clock_skew_is_free() {
        let h = Harness::new().await;
        let user = h.rider("alice", 1500).await;

        h.engine.book_ride(&user, "Elm St", "Elm St", "B1").await.unwrap();
        h.clock.advance(Duration::minutes(-5));
        let ended = h.engine.end_ride(&user).await.unwrap();

        assert_eq!(ended.ride.fare_cents, 0);
        assert_eq!(ended.account.balance_cents, 1500);
    }

    #[tokio::test]
    async fn test_deleted_end_location_blocks_return_until_recreated() {
        let h = Harness::new().await;
        h.db.locations().create("Oak Ave", "1,1").await.unwrap();
        let user = h.rider("alice", 1500).await;

        h.engine.book_ride(&user, "Elm St", "Oak Ave", "B1").await.unwrap();
        assert!(h.db.locations().delete_by_name("Oak Ave").await.unwrap());

        let err = h.engine.end_ride(&user).await.unwrap_err();
        assert_eq!(err.to_string(), "End location with the name Oak Ave does not exist");
        assert_eq!(h.riding().await, 1);
        assert_eq!(h.history_len(&user).await, 0);
        assert_eq!(h.balance(&user).await, 1500);

        let oak = h.db.locations().create("Oak Ave", "2,2").await.unwrap();
        let ended = h.engine.end_ride(&user).await.unwrap();
        assert_eq!(ended.location.id, oak.id);
        assert_eq!(ended.ride.end.coordinates, "2,2");
        assert_eq!(h.bikes_at("Oak Ave").await, vec!["B1".to_string()]);
    }

    #[tokio::test]
    async fn test_ride_snapshot_survives_start_location_deletion() {
        let h = Harness::new().await;
        h.db.locations().create("Oak Ave", "1,1").await.unwrap();
        let user = h.rider("alice", 1500).await;

        h.engine.book_ride(&user, "Elm St", "Oak Ave", "B1").await.unwrap();
        assert!(h.db.locations().delete_by_name("Elm St").await.unwrap());

        let ended = h.engine.end_ride(&user).await.unwrap();
        assert_eq!(ended.ride.start.id, h.elm.id);
        assert_eq!(ended.ride.bike.name, "Bike B1");
        assert!(ended.location.has_bike("B1"));
    }

    #[tokio::test]
    async fn test_every_bike_is_docked_or_ridden() {
        let h = Harness::new().await;
        h.db.locations().create("Oak Ave", "1,1").await.unwrap();
        for id in ["B2", "B3", "B4"] {
            h.dock("Elm St", id).await;
        }
        let total = h.docked().await;

        let riders = [
            h.rider("alice", 5000).await,
            h.rider("bob", 5000).await,
            h.rider("carol", 5000).await,
        ];

        for (rider, bike) in riders.iter().zip(["B1", "B2", "B3"]) {
            h.engine.book_ride(rider, "Elm St", "Oak Ave", bike).await.unwrap();
            assert_eq!(h.docked().await + h.riding().await, total);
        }

        let _ = h.engine.book_ride(&riders[0], "Elm St", "Elm St", "B4").await;
        assert_eq!(h.docked().await + h.riding().await, total);

        h.clock.advance(Duration::minutes(20));
        for rider in &riders {
            h.engine.end_ride(rider).await.unwrap();
            assert_eq!(h.docked().await + h.riding().await, total);
        }

        assert_eq!(h.bikes_at("Oak Ave").await.len(), 3);
        assert_eq!(h.riding().await, 0);
    }
}
