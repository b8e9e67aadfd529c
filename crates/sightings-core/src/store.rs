//! The `SightingStore` trait and supporting query types.
//!
//! Implemented by storage backends (e.g. `sightings-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on a concrete backend.

use std::future::Future;

use crate::{
  geo::GeoPoint,
  sighting::{NewSighting, Sighting},
};

/// Window used by [`RecentQuery`] when none is supplied.
pub const DEFAULT_WINDOW_MINUTES: f64 = 120.0;

/// Hard cap on the number of records any list query returns.
pub const MAX_RESULTS: usize = 500;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`SightingStore::find_recent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentQuery {
  /// Only sightings observed within this many minutes of now are returned.
  pub window_minutes: f64,
  /// Clamped to [`MAX_RESULTS`].
  pub limit:          usize,
}

impl Default for RecentQuery {
  fn default() -> Self {
    Self { window_minutes: DEFAULT_WINDOW_MINUTES, limit: MAX_RESULTS }
  }
}

impl RecentQuery {
  pub fn minutes(window_minutes: f64) -> Self {
    Self { window_minutes: sanitize_window(window_minutes), ..Self::default() }
  }

  /// Window length in whole milliseconds. Never negative.
  pub fn window_ms(&self) -> i64 {
    (sanitize_window(self.window_minutes) * 60_000.0).round() as i64
  }

  pub fn effective_limit(&self) -> usize { self.limit.min(MAX_RESULTS) }
}

/// Non-finite or negative windows fall back to [`DEFAULT_WINDOW_MINUTES`].
pub fn sanitize_window(minutes: f64) -> f64 {
  if minutes.is_finite() && minutes >= 0.0 { minutes } else { DEFAULT_WINDOW_MINUTES }
}

/// Parameters for [`SightingStore::find_near`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearQuery {
  pub center:   GeoPoint,
  pub radius_m: f64,
  /// Clamped to [`MAX_RESULTS`].
  pub limit:    usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a sightings store backend.
///
/// Writes are append-only: a sighting is inserted once and never updated or
/// deleted. All read queries only see [`Approved`] records.
///
/// [`Approved`]: crate::sighting::SightingStatus::Approved
pub trait SightingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new sighting. The store assigns the id, `status` and
  /// `created_at`, and fills in defaults.
  fn create(
    &self,
    input: NewSighting,
  ) -> impl Future<Output = Result<Sighting, Self::Error>> + Send + '_;

  /// The approved sighting with the latest `observed_at`, if any.
  fn find_latest_approved(
    &self,
  ) -> impl Future<Output = Result<Option<Sighting>, Self::Error>> + Send + '_;

  /// Approved sightings observed within the query window, newest first.
  fn find_recent(
    &self,
    query: RecentQuery,
  ) -> impl Future<Output = Result<Vec<Sighting>, Self::Error>> + Send + '_;

  /// Approved sightings within `radius_m` of `center`, nearest first.
  fn find_near(
    &self,
    query: NearQuery,
  ) -> impl Future<Output = Result<Vec<Sighting>, Self::Error>> + Send + '_;

  /// Total number of stored sightings, regardless of status.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
