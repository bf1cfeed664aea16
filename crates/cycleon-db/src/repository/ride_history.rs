//! # Ride History Repository
//!
//! The append-only ledger of completed rides. Rows are inserted once and
//! never updated or deleted; `ride_id` is the primary key, so a ride can be
//! recorded (and therefore charged) only once.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use cycleon_core::{Bike, RideRecord, Stop};

#[derive(Debug, sqlx::FromRow)]
struct RideRecordRow {
    ride_id: String,
    user_id: String,
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
    end_time: DateTime<Utc>,
    fare_cents: i64,
}

impl From<RideRecordRow> for RideRecord {
    fn from(row: RideRecordRow) -> Self {
        RideRecord {
            ride_id: row.ride_id,
            user_id: row.user_id,
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
            end_time: row.end_time,
            fare_cents: row.fare_cents,
        }
    }
}

/// Repository for the ride ledger.
#[derive(Debug, Clone)]
pub struct RideHistoryRepository {
    pool: SqlitePool,
}

impl RideHistoryRepository {
    /// Creates a new RideHistoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RideHistoryRepository { pool }
    }

    /// Lists a user's completed rides, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<RideRecord>> {
        let rows: Vec<RideRecordRow> = sqlx::query_as(
            r#"
            SELECT
                ride_id, user_id,
                bike_id, bike_name, bike_description,
                start_location_id, start_location_name, start_coordinates,
                end_location_id, end_location_name, end_coordinates,
                start_time, end_time, fare_cents
            FROM ride_history
            WHERE user_id = ?1
            ORDER BY end_time, rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(user_id = %user_id, count = rows.len(), "Loaded ride history");
        Ok(rows.into_iter().map(RideRecord::from).collect())
    }

    /// Counts a user's completed rides.
    pub async fn count_for_user(&self, user_id: &str) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM ride_history WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Appends a completed ride.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - This ride id is already recorded
    pub async fn append(conn: &mut SqliteConnection, record: &RideRecord) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ride_history (
                ride_id, user_id,
                bike_id, bike_name, bike_description,
                start_location_id, start_location_name, start_coordinates,
                end_location_id, end_location_name, end_coordinates,
                start_time, end_time, fare_cents
            ) VALUES (
                ?1, ?2,
                ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11,
                ?12, ?13, ?14
            )
            "#,
        )
        .bind(&record.ride_id)
        .bind(&record.user_id)
        .bind(&record.bike.id)
        .bind(&record.bike.name)
        .bind(&record.bike.description)
        .bind(&record.start.id)
        .bind(&record.start.name)
        .bind(&record.start.coordinates)
        .bind(&record.end.id)
        .bind(&record.end.name)
        .bind(&record.end.coordinates)
        .bind(record.start_time)
        .bind(record.end_time)
        .bind(record.fare_cents)
        .execute(&mut *conn)
        .await?;

        debug!(
            ride_id = %record.ride_id,
            user_id = %record.user_id,
            fare_cents = record.fare_cents,
            "Appended ride record"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
