//! # Location Repository
//!
//! The Inventory Store: locations and the bikes docked at them.
//!
//! ## Checkout Race
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Two riders, one bike                                   │
//! │                                                                         │
//! │  ❌ WRONG: read-modify-write                                           │
//! │     bikes = SELECT … WHERE location = Elm St    (both see B1)          │
//! │     write bikes minus B1                        (both "win")           │
//! │                                                                         │
//! │  ✅ CORRECT: conditional delete                                         │
//! │     DELETE FROM location_bikes                                         │
//! │     WHERE bike_id = 'B1' AND location_id = ?                           │
//! │                                                                         │
//! │     Rider A: rows_affected = 1  → checkout proceeds                    │
//! │     Rider B: rows_affected = 0  → BikeUnavailable                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cycleon_core::{Bike, Location};

/// Column reported when a location name is taken.
pub const NAME_COLUMN: &str = "locations.name";

/// Column reported when location coordinates are taken.
pub const COORDINATES_COLUMN: &str = "locations.coordinates";

#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    id: String,
    name: String,
    coordinates: String,
    created_at: DateTime<Utc>,
}

impl LocationRow {
    fn with_bikes(self, bikes: Vec<Bike>) -> Location {
        Location {
            id: self.id,
            name: self.name,
            coordinates: self.coordinates,
            bikes,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DockedBikeRow {
    location_id: String,
    id: String,
    name: String,
    description: String,
}

/// Repository for locations and their docked bikes.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
}

impl LocationRepository {
    /// Creates a new LocationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LocationRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Finds a location and its bikes by name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Location>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_by_name(&mut conn, name).await
    }

    /// Checks whether any location already uses these coordinates.
    pub async fn coordinates_taken(&self, coordinates: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations WHERE coordinates = ?1")
            .bind(coordinates)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Lists every location with its bikes, ordered by name.
    ///
    /// Two queries regardless of location count.
    pub async fn list(&self) -> DbResult<Vec<Location>> {
        let rows: Vec<LocationRow> = sqlx::query_as(
            r#"
            SELECT id, name, coordinates, created_at
            FROM locations
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let docked: Vec<DockedBikeRow> = sqlx::query_as(
            r#"
            SELECT location_id, bike_id AS id, name, description
            FROM location_bikes
            ORDER BY added_at, rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_location: HashMap<String, Vec<Bike>> = HashMap::new();
        for row in docked {
            by_location.entry(row.location_id).or_default().push(Bike {
                id: row.id,
                name: row.name,
                description: row.description,
            });
        }

        let locations = rows
            .into_iter()
            .map(|row| {
                let bikes = by_location.remove(&row.id).unwrap_or_default();
                row.with_bikes(bikes)
            })
            .collect::<Vec<_>>();

        debug!(count = locations.len(), "Listed locations");
        Ok(locations)
    }

    /// Counts docked bikes across all locations.
    pub async fn count_docked_bikes(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM location_bikes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Admin Writes
    // =========================================================================

    /// Creates an empty location.
    ///
    /// ## Returns
    /// * `Ok(Location)` - The new location, no bikes
    /// * `Err(DbError::UniqueViolation)` - `field` is [`NAME_COLUMN`] or
    ///   [`COORDINATES_COLUMN`]
    pub async fn create(&self, name: &str, coordinates: &str) -> DbResult<Location> {
        debug!(name = %name, coordinates = %coordinates, "Creating location");

        let row = LocationRow {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            coordinates: coordinates.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO locations (id, name, coordinates, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&row.id)
        .bind(&row.name)
        .bind(&row.coordinates)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                let value = if field == COORDINATES_COLUMN { coordinates } else { name };
                DbError::duplicate(field, value)
            }
            other => other,
        })?;

        Ok(row.with_bikes(Vec::new()))
    }

    /// Deletes a location by name. Its docked bikes go with it.
    ///
    /// ## Returns
    /// * `Ok(true)` - Location deleted
    /// * `Ok(false)` - No location with that name
    pub async fn delete_by_name(&self, name: &str) -> DbResult<bool> {
        debug!(name = %name, "Deleting location");

        let result = sqlx::query("DELETE FROM locations WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Registers a brand-new bike at a location.
    ///
    /// The bike gets a fresh UUID v4; ids are never reused.
    pub async fn add_new_bike(
        &self,
        location_id: &str,
        name: &str,
        description: &str,
    ) -> DbResult<Bike> {
        let bike = Bike {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
        };

        debug!(location_id = %location_id, bike_id = %bike.id, "Registering bike");

        let mut conn = self.pool.acquire().await?;
        Self::add_bike(&mut conn, location_id, &bike).await?;

        Ok(bike)
    }

    /// Removes a docked bike from the system.
    ///
    /// ## Returns
    /// * `Ok(true)` - Bike deleted
    /// * `Ok(false)` - Bike is not docked at this location
    pub async fn delete_bike(&self, location_id: &str, bike_id: &str) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Self::remove_bike(&mut conn, location_id, bike_id).await
    }

    // =========================================================================
    // Connection Functions (compose inside a transaction)
    // =========================================================================

    /// Loads a location and its bikes by name.
    pub async fn fetch_by_name(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> DbResult<Option<Location>> {
        let row: Option<LocationRow> = sqlx::query_as(
            "SELECT id, name, coordinates, created_at FROM locations WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => {
                let bikes = Self::fetch_bikes(conn, &row.id).await?;
                Ok(Some(row.with_bikes(bikes)))
            }
            None => Ok(None),
        }
    }

    /// Loads a location and its bikes by ID.
    pub async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Location>> {
        let row: Option<LocationRow> = sqlx::query_as(
            "SELECT id, name, coordinates, created_at FROM locations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => {
                let bikes = Self::fetch_bikes(conn, &row.id).await?;
                Ok(Some(row.with_bikes(bikes)))
            }
            None => Ok(None),
        }
    }

    async fn fetch_bikes(conn: &mut SqliteConnection, location_id: &str) -> DbResult<Vec<Bike>> {
        let bikes = sqlx::query_as(
            r#"
            SELECT bike_id AS id, name, description
            FROM location_bikes
            WHERE location_id = ?1
            ORDER BY added_at, rowid
            "#,
        )
        .bind(location_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(bikes)
    }

    /// Atomically takes a bike out of a location's inventory.
    ///
    /// One conditional DELETE. Of any number of concurrent callers for the
    /// same bike, exactly one sees `true`.
    ///
    /// ## Returns
    /// * `Ok(true)` - This call removed the bike
    /// * `Ok(false)` - The bike was not docked here (already taken, or never was)
    pub async fn remove_bike(
        conn: &mut SqliteConnection,
        location_id: &str,
        bike_id: &str,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            "DELETE FROM location_bikes WHERE bike_id = ?1 AND location_id = ?2",
        )
        .bind(bike_id)
        .bind(location_id)
        .execute(&mut *conn)
        .await?;

        let removed = result.rows_affected() == 1;
        debug!(location_id = %location_id, bike_id = %bike_id, removed, "Remove bike");
        Ok(removed)
    }

    /// Atomically docks a bike at a location.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - The bike is already docked somewhere
    /// * `Err(DbError::ForeignKeyViolation)` - The location does not exist
    pub async fn add_bike(
        conn: &mut SqliteConnection,
        location_id: &str,
        bike: &Bike,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO location_bikes (bike_id, location_id, name, description, added_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&bike.id)
        .bind(location_id)
        .bind(&bike.name)
        .bind(&bike.description)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        debug!(location_id = %location_id, bike_id = %bike.id, "Docked bike");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
