//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as epoch milliseconds so the time index orders them
//! numerically. Locations are stored as compact GeoJSON. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use sightings_core::{
  geo::GeoPoint,
  sighting::{Sighting, SightingStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

/// Columns selected by every read query, in [`RawSighting`] field order.
pub const SIGHTING_COLUMNS: &str =
  "sighting_id, observed_at, loc, accuracy_m, description, status, created_at";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> i64 { dt.timestamp_millis() }

pub fn decode_dt(ms: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp_millis(ms).ok_or(Error::Timestamp(ms))
}

/// Drop sub-millisecond precision so a value survives a round-trip unchanged.
pub fn truncate_dt(dt: DateTime<Utc>) -> Result<DateTime<Utc>> {
  decode_dt(encode_dt(dt))
}

// ─── Location ─────────────────────────────────────────────────────────────────

pub fn encode_location(p: &GeoPoint) -> Result<String> {
  Ok(serde_json::to_string(p)?)
}

pub fn decode_location(s: &str) -> Result<GeoPoint> {
  Ok(serde_json::from_str(s)?)
}

// ─── SightingStatus ───────────────────────────────────────────────────────────

pub fn encode_status(s: SightingStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<SightingStatus> {
  match s {
    "approved" => Ok(SightingStatus::Approved),
    "pending" => Ok(SightingStatus::Pending),
    "rejected" => Ok(SightingStatus::Rejected),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `sightings` row.
pub struct RawSighting {
  pub sighting_id: String,
  pub observed_at: i64,
  pub loc:         String,
  pub accuracy_m:  f64,
  pub description: String,
  pub status:      String,
  pub created_at:  i64,
}

impl RawSighting {
  /// Row mapper for queries selecting [`SIGHTING_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      sighting_id: row.get(0)?,
      observed_at: row.get(1)?,
      loc:         row.get(2)?,
      accuracy_m:  row.get(3)?,
      description: row.get(4)?,
      status:      row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_sighting(self) -> Result<Sighting> {
    Ok(Sighting {
      id:          decode_uuid(&self.sighting_id)?,
      observed_at: decode_dt(self.observed_at)?,
      location:    decode_location(&self.loc)?,
      accuracy_m:  self.accuracy_m,
      description: self.description,
      status:      decode_status(&self.status)?,
      created_at:  decode_dt(self.created_at)?,
    })
  }
}
