//! SQLite persistence for Calibra.
//!
//! Write path is a single serialized connection; reads go through a small
//! pool. Item statistics carry a version counter for optimistic
//! concurrency; status history and the audit run log are append-only.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod store;

pub use connection::DatabaseManager;
pub use store::SqliteStatisticsStore;
