//! SQL schema for the sightings SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Append-only: no UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS sightings (
    seq          INTEGER PRIMARY KEY,       -- rowid; keys sightings_geo
    sighting_id  TEXT    NOT NULL UNIQUE,
    observed_at  INTEGER NOT NULL,          -- epoch milliseconds, UTC
    loc          TEXT    NOT NULL,          -- GeoJSON point, [lng, lat]
    accuracy_m   REAL    NOT NULL CHECK (accuracy_m BETWEEN 0 AND 1000),
    description  TEXT    NOT NULL DEFAULT '' CHECK (length(description) <= 500),
    status       TEXT    NOT NULL DEFAULT 'approved'
                 CHECK (status IN ('approved', 'pending', 'rejected')),
    created_at   INTEGER NOT NULL           -- epoch milliseconds, UTC
);

-- Serves latest/recent: equality on status, then newest first.
CREATE INDEX IF NOT EXISTS sightings_status_observed_idx
    ON sightings(status, observed_at DESC);

-- Geospatial index; points are stored as degenerate boxes.
CREATE VIRTUAL TABLE IF NOT EXISTS sightings_geo USING rtree(
    seq,
    min_lng, max_lng,
    min_lat, max_lat
);

PRAGMA user_version = 1;
";
