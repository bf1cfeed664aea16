//! # Cycleon API
//!
//! HTTP service in front of the ride engine and the stores.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Cycleon API                                   │
//! │                                                                         │
//! │  rider (x-auth-token, role=user)        admin (x-auth-token, role=admin)│
//! │  ┌───────────────────────────────┐      ┌─────────────────────────────┐ │
//! │  │ GET  /api/auth                │      │ POST   addLocation          │ │
//! │  │ GET  /api/locations           │      │ POST   addBike              │ │
//! │  │ PUT  /api/users/addBalance    │      │ DELETE deleteBike           │ │
//! │  │ PUT  /api/rides/bookRide   ───┼──┐   │ DELETE deleteLocation       │ │
//! │  │ PUT  /api/rides/endRide    ───┼──┤   └──────────────┬──────────────┘ │
//! │  │ GET  /api/rides/history       │  │                  │                │
//! │  └───────────────┬───────────────┘  ▼                  │                │
//! │                  │            ┌────────────┐           │                │
//! │                  │            │ RideEngine │           │                │
//! │                  │            └─────┬──────┘           │                │
//! │                  ▼                  ▼                  ▼                │
//! │            ┌──────────────────────────────────────────────────┐         │
//! │            │                 Database (SQLite)                │         │
//! │            └──────────────────────────────────────────────────┘         │
//! │                                                                         │
//! │  GET /health (no token)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `PORT` - HTTP port (default: 5000)
//! - `DATABASE_PATH` - SQLite file (default: ./cycleon.db)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - Token lifetime (default: 3600)
//! - `FARE_RATE_CENTS_PER_HOUR` - Ride price (default: 1000)
//! - `MIN_BOOKING_BALANCE_CENTS` - Booking threshold (default: 1000)

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use cycleon_db::Database;
use cycleon_rides::RideEngine;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

// Re-exports
pub use auth::{JwtManager, Role};
pub use config::ApiConfig;
pub use error::ApiError;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: RideEngine,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, engine: RideEngine, jwt: JwtManager) -> Self {
        AppState {
            db,
            engine,
            jwt: Arc::new(jwt),
        }
    }
}

/// Builds the full router with request tracing.
pub fn build_router(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
