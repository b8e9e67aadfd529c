//! SQLite backend for the sightings store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Sightings are indexed twice: by
//! `(status, observed_at DESC)` for the time-ordered reads, and through an
//! R*Tree virtual table for proximity queries.

mod database;
mod encode;
mod schema;
mod store;

pub mod error;

pub use database::{Database, StoreLocation};
pub use error::{Error, Result};
pub use store::SqliteStore;
