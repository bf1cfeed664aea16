//! # Repository Module
//!
//! Database repository implementations for Cycleon.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler / RideEngine                                             │
//! │       │                                                                 │
//! │       │  db.locations().find_by_name("Elm St")       pool method       │
//! │       │  LocationRepository::remove_bike(&mut tx, …)  tx function       │
//! │       ▼                                                                 │
//! │  LocationRepository      AccountRepository      RideHistoryRepository  │
//! │  (Inventory Store)       (Account Store)        (Ride History Ledger)  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every function taking `&mut SqliteConnection` is ONE statement and    │
//! │  therefore atomic on its own. Callers compose them in a transaction.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`LocationRepository`](location::LocationRepository) - Locations and docked bikes
//! - [`AccountRepository`](account::AccountRepository) - Balances and active rides
//! - [`RideHistoryRepository`](ride_history::RideHistoryRepository) - Completed rides

pub mod account;
pub mod location;
pub mod ride_history;
