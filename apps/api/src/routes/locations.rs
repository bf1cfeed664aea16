//! Location browsing.

use axum::{extract::State, Json};

use cycleon_core::Location;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

/// `GET /api/locations` - every location with the bikes docked there now.
pub async fn list_locations(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(state.db.locations().list().await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::routes::test_support::{first_msg, TestApp};

    #[tokio::test]
    async fn test_lists_locations_with_bikes() {
        let app = TestApp::new().await;
        let bike_id = app.dock("Elm St").await;

        let (status, body) = app.as_user(Method::GET, "/api/locations", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["locationName"], "Elm St");
        assert_eq!(body[0]["bikes"][0]["id"], bike_id.as_str());
    }

    #[tokio::test]
    async fn test_requires_token() {
        let app = TestApp::new().await;

        let (status, body) = app.call(Method::GET, "/api/locations", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(first_msg(&body), "No token access denied.");

        let (status, body) = app
            .call(Method::GET, "/api/locations", Some("garbage"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(first_msg(&body), "Token is not valid");
    }
}
