//! Sighting types: the stored record and the store input.
//!
//! A sighting is written once and never modified. The wire form mirrors the
//! persisted document: `when`, `loc`, `accuracyM`, `description`, `status`,
//! `createdAt`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

/// Accuracy radius applied when the caller supplies none.
pub const DEFAULT_ACCURACY_M: f64 = 20.0;

/// Upper bound for the accuracy radius; larger values are clamped.
pub const MAX_ACCURACY_M: f64 = 1_000.0;

/// Descriptions longer than this many characters are truncated.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Moderation status. Every create path produces [`SightingStatus::Approved`];
/// the other values exist so stored records can carry them.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SightingStatus {
  #[default]
  Approved,
  Pending,
  Rejected,
}

impl SightingStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Approved => "approved",
      Self::Pending => "pending",
      Self::Rejected => "rejected",
    }
  }
}

// ─── Sighting ────────────────────────────────────────────────────────────────

/// A persisted sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sighting {
  pub id:          Uuid,
  /// When the event was observed; client-supplied or the receipt time.
  #[serde(rename = "when")]
  pub observed_at: DateTime<Utc>,
  #[serde(rename = "loc")]
  pub location:    GeoPoint,
  #[serde(rename = "accuracyM")]
  pub accuracy_m:  f64,
  pub description: String,
  pub status:      SightingStatus,
  /// Server-assigned write time; never changes.
  pub created_at:  DateTime<Utc>,
}

// ─── NewSighting ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::SightingStore::create`].
///
/// Only the location is mandatory. `status` and `created_at` are not accepted
/// from callers; the store assigns them.
#[derive(Debug, Clone)]
pub struct NewSighting {
  pub location:    GeoPoint,
  pub observed_at: Option<DateTime<Utc>>,
  pub accuracy_m:  Option<f64>,
  pub description: Option<String>,
}

impl NewSighting {
  pub fn new(location: GeoPoint) -> Self {
    Self { location, observed_at: None, accuracy_m: None, description: None }
  }

  pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
    self.observed_at = Some(at);
    self
  }

  pub fn accuracy_m(mut self, accuracy_m: f64) -> Self {
    self.accuracy_m = Some(accuracy_m);
    self
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  /// Apply defaults and schema limits, producing the record to persist.
  pub fn into_sighting(self, id: Uuid, now: DateTime<Utc>) -> Sighting {
    Sighting {
      id,
      observed_at: self.observed_at.unwrap_or(now),
      location: self.location,
      accuracy_m: normalize_accuracy(self.accuracy_m),
      description: truncate_description(self.description.as_deref().unwrap_or_default()),
      status: SightingStatus::Approved,
      created_at: now,
    }
  }
}

/// Missing or non-finite values become the default; everything else is
/// clamped into `[0, MAX_ACCURACY_M]`.
pub fn normalize_accuracy(accuracy_m: Option<f64>) -> f64 {
  match accuracy_m {
    Some(v) if v.is_finite() => v.clamp(0.0, MAX_ACCURACY_M),
    _ => DEFAULT_ACCURACY_M,
  }
}

pub fn truncate_description(description: &str) -> String {
  description.chars().take(MAX_DESCRIPTION_CHARS).collect()
}
