//! Handlers for `/sightings` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sightings` | Body: client or storage form; returns `{"ok":true,"id":...}` |
//! | `GET`  | `/sightings/latest` | Latest approved sighting or `null` |
//! | `GET`  | `/sightings` | Optional `?minutes=N` (default 120); at most 500, newest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use sightings_core::{
  sighting::Sighting,
  store::{DEFAULT_WINDOW_MINUTES, RecentQuery, SightingStore, sanitize_window},
};
use uuid::Uuid;

use crate::{error::ApiError, payload::SightingPayload};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
  pub ok: bool,
  pub id: Uuid,
}

/// `POST /sightings`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<SightingPayload>, JsonRejection>,
) -> Result<Json<Created>, ApiError>
where
  S: SightingStore,
{
  let Json(payload) = body
    .map_err(|e| ApiError::Validation(sightings_core::Error::MalformedBody(e.body_text())))?;
  let input = payload.into_new_sighting()?;

  let sighting = store.create(input).await.map_err(ApiError::store)?;
  tracing::info!(id = %sighting.id, "sighting recorded");
  Ok(Json(Created { ok: true, id: sighting.id }))
}

// ─── Latest ───────────────────────────────────────────────────────────────────

/// `GET /sightings/latest`
pub async fn latest<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Option<Sighting>>, ApiError>
where
  S: SightingStore,
{
  let sighting = store.find_latest_approved().await.map_err(ApiError::store)?;
  Ok(Json(sighting))
}

// ─── Recent ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecentParams {
  /// Kept as text so that garbage falls back to the default window instead of
  /// rejecting the request.
  pub minutes: Option<String>,
}

/// Parse the `minutes` parameter; anything non-numeric, non-finite or negative
/// yields the default window.
pub fn window_minutes(raw: Option<&str>) -> f64 {
  raw
    .and_then(|s| s.trim().parse::<f64>().ok())
    .map(sanitize_window)
    .unwrap_or(DEFAULT_WINDOW_MINUTES)
}

/// `GET /sightings[?minutes=N]`
pub async fn recent<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<RecentParams>,
) -> Result<Json<Vec<Sighting>>, ApiError>
where
  S: SightingStore,
{
  let query = RecentQuery::minutes(window_minutes(params.minutes.as_deref()));
  let sightings = store.find_recent(query).await.map_err(ApiError::store)?;
  Ok(Json(sightings))
}
