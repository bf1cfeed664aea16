//! HTTP error type.
//!
//! Every failure leaves the service in one wire shape:
//!
//! ```text
//! HTTP/1.1 400 Bad Request
//! {"errors":[{"msg":"User Already has an active ride."}]}
//! ```
//!
//! | Variant        | Status | Message                       |
//! |----------------|--------|-------------------------------|
//! | `Validation`   | 400    | one entry per failed rule     |
//! | `Rule`         | 400    | the business rule's message   |
//! | `NoToken`      | 401    | "No token access denied."     |
//! | `InvalidToken` | 401    | "Token is not valid"          |
//! | `Forbidden`    | 403    | "Admin access required"       |
//! | `Internal`     | 500    | "Server Error" (cause logged) |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use cycleon_core::{CoreError, ValidationError};
use cycleon_db::DbError;
use cycleon_rides::RideError;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error("No token access denied.")]
    NoToken,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("Admin access required")]
    Forbidden,

    /// The cause is logged when the response is built; the caller only
    /// ever sees "Server Error".
    #[error("Server Error")]
    Internal(String),
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Rule(_) => StatusCode::BAD_REQUEST,
            ApiError::NoToken | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ApiError::Validation(errors.iter().map(ToString::to_string).collect())
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::Validation(vec![error.to_string()])
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        ApiError::Internal(error.to_string())
    }
}

impl From<RideError> for ApiError {
    fn from(error: RideError) -> Self {
        match error {
            RideError::Rule(rule) => ApiError::Rule(rule),
            RideError::Store(store) => store.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Serialize)]
struct ErrorEntry {
    msg: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            error!(error = %cause, "Request failed");
        }

        let body = ErrorBody {
            errors: self
                .messages()
                .into_iter()
                .map(|msg| ErrorEntry { msg })
                .collect(),
        };

        (self.status(), Json(body)).into_response()
    }
}
