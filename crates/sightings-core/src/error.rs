//! Error types for `sightings-core`.
//!
//! Every variant here is a validation failure: the input could not be turned
//! into a well-formed [`NewSighting`](crate::sighting::NewSighting).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("latitude {0} is outside [-90, 90]")]
  LatitudeOutOfRange(f64),

  #[error("longitude {0} is outside [-180, 180]")]
  LongitudeOutOfRange(f64),

  #[error("coordinates must be finite numbers")]
  NonFiniteCoordinate,

  #[error("location is missing")]
  MissingLocation,

  #[error("malformed location: {0}")]
  MalformedLocation(String),

  #[error("invalid timestamp: {0}")]
  InvalidTimestamp(String),

  #[error("malformed request body: {0}")]
  MalformedBody(String),
}

impl Error {
  /// Short machine-readable code returned to HTTP clients.
  pub fn code(&self) -> &'static str {
    match self {
      Self::LatitudeOutOfRange(_)
      | Self::LongitudeOutOfRange(_)
      | Self::NonFiniteCoordinate
      | Self::MissingLocation
      | Self::MalformedLocation(_) => "invalid_location",
      Self::InvalidTimestamp(_) => "invalid_timestamp",
      Self::MalformedBody(_) => "invalid_body",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
