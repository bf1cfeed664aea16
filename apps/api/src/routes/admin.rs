//! Admin inventory routes (`/api/adminActions/*`).
//!
//! None of these touch a bike that is out on a ride: a ride holds its own
//! copy of the bike until it is returned.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use cycleon_core::validation::{
    collect, validate_bike_description, validate_bike_id, validate_bike_name, validate_coordinates,
    validate_location_name,
};
use cycleon_core::{CoreError, Location, ValidationError};
use cycleon_db::repository::location::{COORDINATES_COLUMN, NAME_COLUMN};
use cycleon_db::DbError;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::routes::ApiJson;
use crate::AppState;

fn reject_invalid(errors: Vec<ValidationError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

async fn location_named(state: &AppState, name: &str) -> Result<Location, ApiError> {
    state
        .db
        .locations()
        .find_by_name(name)
        .await?
        .ok_or_else(|| CoreError::LocationNotFound(name.to_string()).into())
}

// =============================================================================
// Locations
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLocationRequest {
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub coordinates: String,
}

/// `POST /api/adminActions/addLocation`
///
/// Coordinates are checked before the name, so a request duplicating both
/// reports the coordinates.
pub async fn add_location(
    admin: AdminUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddLocationRequest>,
) -> Result<Json<Location>, ApiError> {
    reject_invalid(collect([
        validate_location_name("locationName", &request.location_name),
        validate_coordinates(&request.coordinates),
    ]))?;

    let name = request.location_name.trim();
    let coordinates = request.coordinates.trim();
    let locations = state.db.locations();

    if locations.coordinates_taken(coordinates).await? {
        return Err(CoreError::DuplicateCoordinates(coordinates.to_string()).into());
    }
    if locations.find_by_name(name).await?.is_some() {
        return Err(CoreError::DuplicateLocationName(name.to_string()).into());
    }

    // A concurrent request can still win between the checks and the insert.
    let location = locations.create(name, coordinates).await.map_err(|e| {
        if e.is_duplicate_of(COORDINATES_COLUMN) {
            ApiError::Rule(CoreError::DuplicateCoordinates(coordinates.to_string()))
        } else if e.is_duplicate_of(NAME_COLUMN) {
            ApiError::Rule(CoreError::DuplicateLocationName(name.to_string()))
        } else {
            e.into()
        }
    })?;

    info!(admin_id = %admin.admin_id, location = %location.name, "Location added");
    Ok(Json(location))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLocationRequest {
    #[serde(default)]
    pub location_name: String,
}

/// `DELETE /api/adminActions/deleteLocation` - returns the location as it
/// was just before deletion.
pub async fn delete_location(
    admin: AdminUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeleteLocationRequest>,
) -> Result<Json<Location>, ApiError> {
    reject_invalid(collect([validate_location_name(
        "locationName",
        &request.location_name,
    )]))?;

    let name = request.location_name.trim();
    let location = location_named(&state, name).await?;

    if !state.db.locations().delete_by_name(name).await? {
        return Err(CoreError::LocationNotFound(name.to_string()).into());
    }

    info!(
        admin_id = %admin.admin_id,
        location = %name,
        bikes_removed = location.bikes.len(),
        "Location deleted"
    );
    Ok(Json(location))
}

// =============================================================================
// Bikes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBikeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location_name: String,
}

/// `POST /api/adminActions/addBike` - registers a bike under a fresh id and
/// returns the location holding it.
pub async fn add_bike(
    admin: AdminUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddBikeRequest>,
) -> Result<Json<Location>, ApiError> {
    reject_invalid(collect([
        validate_bike_name(&request.name),
        validate_bike_description(&request.description),
        validate_location_name("locationName", &request.location_name),
    ]))?;

    let name = request.location_name.trim();
    let location = location_named(&state, name).await?;

    let bike = state
        .db
        .locations()
        .add_new_bike(&location.id, request.name.trim(), request.description.trim())
        .await
        .map_err(|e| match e {
            // Location deleted since the lookup.
            DbError::ForeignKeyViolation { .. } => {
                ApiError::Rule(CoreError::LocationNotFound(name.to_string()))
            }
            other => other.into(),
        })?;

    info!(admin_id = %admin.admin_id, location = %name, bike_id = %bike.id, "Bike added");
    Ok(Json(location_named(&state, name).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBikeRequest {
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub bike_id: String,
}

/// `DELETE /api/adminActions/deleteBike` - only a docked bike can be deleted.
pub async fn delete_bike(
    admin: AdminUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeleteBikeRequest>,
) -> Result<Json<Location>, ApiError> {
    reject_invalid(collect([
        validate_location_name("locationName", &request.location_name),
        validate_bike_id(&request.bike_id),
    ]))?;

    let name = request.location_name.trim();
    let bike_id = request.bike_id.trim();
    let location = location_named(&state, name).await?;

    if !state.db.locations().delete_bike(&location.id, bike_id).await? {
        return Err(CoreError::BikeNotFound {
            bike_id: bike_id.to_string(),
        }
        .into());
    }

    info!(admin_id = %admin.admin_id, location = %name, bike_id = %bike_id, "Bike deleted");
    Ok(Json(location_named(&state, name).await?))
}
