//! [`SqliteStore`] — the SQLite implementation of [`SightingStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use sightings_core::{
  geo::BoundingBox,
  sighting::{NewSighting, Sighting, SightingStatus},
  store::{NearQuery, RecentQuery, SightingStore, MAX_RESULTS},
};
use uuid::Uuid;

use crate::{
  encode::{
    encode_dt, encode_location, encode_status, encode_uuid, truncate_dt, RawSighting,
    SIGHTING_COLUMNS,
  },
  schema::SCHEMA,
  Result,
};

/// How long a write waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sightings store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, busy_timeout).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with(DEFAULT_BUSY_TIMEOUT).await
  }

  pub async fn open_in_memory_with(busy_timeout: Duration) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, busy_timeout).await
  }

  async fn init(conn: tokio_rusqlite::Connection, busy_timeout: Duration) -> Result<Self> {
    conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn })
  }

  /// Close the underlying connection. Other clones of this store fail with a
  /// connection-closed error afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Insert the row and its geo index entry in one transaction.
  async fn insert(&self, sighting: &Sighting) -> Result<()> {
    let id_str          = encode_uuid(sighting.id);
    let observed_at     = encode_dt(sighting.observed_at);
    let loc_json        = encode_location(&sighting.location)?;
    let accuracy_m      = sighting.accuracy_m;
    let description     = sighting.description.clone();
    let status_str      = encode_status(sighting.status);
    let created_at      = encode_dt(sighting.created_at);
    let (lng, lat)      = (sighting.location.lng(), sighting.location.lat());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO sightings (
             sighting_id, observed_at, loc, accuracy_m,
             description, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            observed_at,
            loc_json,
            accuracy_m,
            description,
            status_str,
            created_at,
          ],
        )?;
        let seq = tx.last_insert_rowid();
        tx.execute(
          "INSERT INTO sightings_geo (seq, min_lng, max_lng, min_lat, max_lat)
           VALUES (?1, ?2, ?2, ?3, ?3)",
          rusqlite::params![seq, lng, lat],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SightingStore impl ──────────────────────────────────────────────────────

impl SightingStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, input: NewSighting) -> Result<Sighting> {
    let now = truncate_dt(Utc::now())?;
    let mut sighting = input.into_sighting(Uuid::new_v4(), now);
    sighting.observed_at = truncate_dt(sighting.observed_at)?;

    self.insert(&sighting).await?;
    tracing::debug!(id = %sighting.id, "recorded sighting");
    Ok(sighting)
  }

  async fn find_latest_approved(&self) -> Result<Option<Sighting>> {
    let status = encode_status(SightingStatus::Approved);

    let raw: Option<RawSighting> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SIGHTING_COLUMNS} FROM sightings
                 WHERE status = ?1
                 ORDER BY observed_at DESC
                 LIMIT 1"
              ),
              rusqlite::params![status],
              RawSighting::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSighting::into_sighting).transpose()
  }

  async fn find_recent(&self, query: RecentQuery) -> Result<Vec<Sighting>> {
    let status = encode_status(SightingStatus::Approved);
    let since  = encode_dt(Utc::now()).saturating_sub(query.window_ms());
    let limit  = query.effective_limit() as i64;

    let raws: Vec<RawSighting> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SIGHTING_COLUMNS} FROM sightings
           WHERE status = ?1 AND observed_at >= ?2
           ORDER BY observed_at DESC
           LIMIT ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status, since, limit], RawSighting::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSighting::into_sighting).collect()
  }

  async fn find_near(&self, query: NearQuery) -> Result<Vec<Sighting>> {
    let status = encode_status(SightingStatus::Approved);
    let bbox   = BoundingBox::around(query.center, query.radius_m);

    // The R*Tree narrows candidates to the bounding box; exact distances are
    // checked below.
    let raws: Vec<RawSighting> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.sighting_id, s.observed_at, s.loc, s.accuracy_m,
                  s.description, s.status, s.created_at
           FROM sightings_geo g
           JOIN sightings s ON s.seq = g.seq
           WHERE g.max_lng >= ?1 AND g.min_lng <= ?2
             AND g.max_lat >= ?3 AND g.min_lat <= ?4
             AND s.status = ?5",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![bbox.min_lng, bbox.max_lng, bbox.min_lat, bbox.max_lat, status],
            RawSighting::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut hits: Vec<(f64, Sighting)> = raws
      .into_iter()
      .map(RawSighting::into_sighting)
      .collect::<Result<Vec<_>>>()?
      .into_iter()
      .map(|s| (query.center.distance_to(&s.location), s))
      .filter(|(d, _)| *d <= query.radius_m)
      .collect();

    hits.sort_by(|a, b| a.0.total_cmp(&b.0));
    hits.truncate(query.limit.min(MAX_RESULTS));
    Ok(hits.into_iter().map(|(_, s)| s).collect())
  }

  async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM sightings", [], |r| r.get(0))?))
      .await?;
    Ok(n as u64)
  }
}
