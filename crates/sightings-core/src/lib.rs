//! Core types and trait definitions for the sightings service.
//!
//! This crate is free of HTTP and database dependencies. The store backend,
//! the JSON API and the client all build on the types defined here.

pub mod error;
pub mod geo;
pub mod sighting;
pub mod store;

pub use error::{Error, Result};
