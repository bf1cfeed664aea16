//! # cycleon-db: Database Layer for Cycleon
//!
//! This crate provides database access for Cycleon.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cycleon Data Flow                                │
//! │                                                                         │
//! │  RideEngine::book_ride / HTTP handler                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    cycleon-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ LocationRepo   │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ AccountRepo    │   │ 001_init.sql │  │   │
//! │  │   │ begin() → tx  │    │ RideHistoryRepo│   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (cycleon.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Kinds of Repository Methods
//!
//! - **Pool methods** (`&self`): reads and admin writes that stand alone.
//! - **Connection functions** (`&mut SqliteConnection`): single-statement
//!   atomic operations the ride engine composes inside one transaction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cycleon_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./cycleon.db")).await?;
//!
//! let elm = db.locations().find_by_name("Elm St").await?;
//!
//! let mut tx = db.begin().await?;
//! let removed = LocationRepository::remove_bike(&mut tx, &elm.id, "B1").await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::account::AccountRepository;
pub use repository::location::LocationRepository;
pub use repository::ride_history::RideHistoryRepository;
