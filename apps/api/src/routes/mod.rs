//! Route table and shared request plumbing.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::AppState;

pub mod admin;
pub mod health;
pub mod locations;
pub mod rides;
pub mod users;

/// Every route, before state and tracing are attached.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/auth", get(users::current_user))
        .route("/api/locations", get(locations::list_locations))
        .route("/api/users/addBalance", put(users::add_balance))
        .route("/api/rides/bookRide", put(rides::book_ride))
        .route("/api/rides/endRide", put(rides::end_ride))
        .route("/api/rides/history", get(rides::history))
        .route("/api/adminActions/addLocation", post(admin::add_location))
        .route("/api/adminActions/addBike", post(admin::add_bike))
        .route("/api/adminActions/deleteBike", delete(admin::delete_bike))
        .route("/api/adminActions/deleteLocation", delete(admin::delete_location))
}

/// `Json` whose rejection uses the `{"errors":[{"msg"}]}` body.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::Validation(vec![rejection.body_text()]))?;
        Ok(ApiJson(value))
    }
}
