//! Error type for `sightings-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("stored timestamp out of range: {0}")]
  Timestamp(i64),

  #[error("unknown sighting status: {0:?}")]
  UnknownStatus(String),

  #[error("invalid database url: {0:?}")]
  InvalidDatabaseUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
