//! # Lecture DataStore
//!
//! Persistence boundary for orchestration results. One durable record is kept
//! per video id: the opaque result id, the serialized aggregate payload, and
//! the creation timestamp the cache layer uses for freshness checks.
//!
//! The module uses sqlx for database operations and exposes a small trait so
//! the engine crate can be tested against in-memory stores.

mod datastore;
mod domain;

pub use datastore::postgres::PgDataStore;
pub use datastore::DataStore;
pub use domain::ResultRecord;
