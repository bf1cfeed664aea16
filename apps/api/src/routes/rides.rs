//! Ride routes: the HTTP face of [`cycleon_rides::RideEngine`].

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use cycleon_core::validation::{collect, validate_bike_id, validate_location_name};
use cycleon_core::{Account, Location, RideRecord};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::ApiJson;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRideRequest {
    #[serde(default)]
    pub start_location_name: String,
    #[serde(default)]
    pub end_location_name: String,
    #[serde(default)]
    pub bike_id: String,
}

#[derive(Debug, Serialize)]
pub struct BookRideResponse {
    /// The start location, without the booked bike.
    pub location: Location,
    pub user: Account,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndRideResponse {
    pub end_ride_location: Location,
    pub user: Account,
    pub ride: RideRecord,
}

/// `PUT /api/rides/bookRide`
pub async fn book_ride(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BookRideRequest>,
) -> Result<Json<BookRideResponse>, ApiError> {
    let errors = collect([
        validate_location_name("startLocationName", &request.start_location_name),
        validate_location_name("endLocationName", &request.end_location_name),
        validate_bike_id(&request.bike_id),
    ]);
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let booked = state
        .engine
        .book_ride(
            &user.user_id,
            request.start_location_name.trim(),
            request.end_location_name.trim(),
            request.bike_id.trim(),
        )
        .await?;

    Ok(Json(BookRideResponse {
        location: booked.location,
        user: booked.account,
    }))
}

/// `PUT /api/rides/endRide` - ends the caller's own ride. The body, if any,
/// is ignored.
pub async fn end_ride(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<EndRideResponse>, ApiError> {
    let ended = state.engine.end_ride(&user.user_id).await?;

    Ok(Json(EndRideResponse {
        end_ride_location: ended.location,
        user: ended.account,
        ride: ended.ride,
    }))
}

/// `GET /api/rides/history` - oldest first.
pub async fn history(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RideRecord>>, ApiError> {
    Ok(Json(state.db.ride_history().list_for_user(&user.user_id).await?))
}
