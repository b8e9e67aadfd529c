//! Geographic primitives: the validated [`GeoPoint`], great-circle distance,
//! and the bounding boxes used to prefilter proximity queries.
//!
//! Coordinates are always carried longitude-first, matching GeoJSON and the
//! geospatial index. Swapping the axes is the classic bug here, so a point can
//! only be built through [`GeoPoint::new`], which takes `(lng, lat)` in that
//! order and range-checks both.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mean Earth radius used by [`haversine_m`], in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ─── GeoPoint ────────────────────────────────────────────────────────────────

/// A validated WGS84 position.
///
/// Serialises as a GeoJSON point: `{"type":"Point","coordinates":[lng,lat]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoJsonPoint", into = "GeoJsonPoint")]
pub struct GeoPoint {
  lng: f64,
  lat: f64,
}

impl GeoPoint {
  /// Build a point from longitude and latitude, in that order.
  pub fn new(lng: f64, lat: f64) -> Result<Self> {
    if !lng.is_finite() || !lat.is_finite() {
      return Err(Error::NonFiniteCoordinate);
    }
    if !(-180.0..=180.0).contains(&lng) {
      return Err(Error::LongitudeOutOfRange(lng));
    }
    if !(-90.0..=90.0).contains(&lat) {
      return Err(Error::LatitudeOutOfRange(lat));
    }
    Ok(Self { lng, lat })
  }

  pub fn lng(&self) -> f64 { self.lng }

  pub fn lat(&self) -> f64 { self.lat }

  /// The `[lng, lat]` pair as stored.
  pub fn coordinates(&self) -> [f64; 2] { [self.lng, self.lat] }

  /// Great-circle distance to `other`, in metres.
  pub fn distance_to(&self, other: &GeoPoint) -> f64 {
    haversine_m(self.lat, self.lng, other.lat, other.lng)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum PointKind {
  Point,
}

/// Wire form of [`GeoPoint`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeoJsonPoint {
  #[serde(rename = "type")]
  kind:        PointKind,
  coordinates: Vec<f64>,
}

impl TryFrom<GeoJsonPoint> for GeoPoint {
  type Error = Error;

  fn try_from(raw: GeoJsonPoint) -> Result<Self> {
    match raw.coordinates.as_slice() {
      [lng, lat] => GeoPoint::new(*lng, *lat),
      other => Err(Error::MalformedLocation(format!(
        "expected [lng, lat], got {} values",
        other.len()
      ))),
    }
  }
}

impl From<GeoPoint> for GeoJsonPoint {
  fn from(p: GeoPoint) -> Self {
    Self { kind: PointKind::Point, coordinates: vec![p.lng, p.lat] }
  }
}

// ─── Distance ────────────────────────────────────────────────────────────────

/// Haversine great-circle distance in metres between two positions given in
/// degrees, latitude first.
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
  let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
  let d_phi = (lat2 - lat1).to_radians();
  let d_lambda = (lng2 - lng1).to_radians();

  let a = (d_phi / 2.0).sin().powi(2)
    + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
  // Rounding can push `a` a hair past 1 for antipodal points.
  let a = a.clamp(0.0, 1.0);

  2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

// ─── Bounding box ────────────────────────────────────────────────────────────

/// An axis-aligned lat/lng rectangle, inclusive on all edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  pub min_lng: f64,
  pub max_lng: f64,
  pub min_lat: f64,
  pub max_lat: f64,
}

impl BoundingBox {
  /// The smallest box guaranteed to contain every point within `radius_m` of
  /// `center`.
  ///
  /// Near the poles, or when the circle crosses the antimeridian, the box
  /// widens to the full longitude range rather than wrapping.
  pub fn around(center: GeoPoint, radius_m: f64) -> Self {
    let radius_m = radius_m.max(0.0);
    let d_lat = (radius_m / EARTH_RADIUS_M).to_degrees();
    let min_lat = (center.lat - d_lat).max(-90.0);
    let max_lat = (center.lat + d_lat).min(90.0);

    let cos_lat = center.lat.to_radians().cos();
    let (min_lng, max_lng) = if min_lat <= -90.0 || max_lat >= 90.0 || cos_lat < 1e-9 {
      (-180.0, 180.0)
    } else {
      let d_lng = d_lat / cos_lat;
      let (lo, hi) = (center.lng - d_lng, center.lng + d_lng);
      if lo < -180.0 || hi > 180.0 {
        (-180.0, 180.0)
      } else {
        (lo, hi)
      }
    };

    Self { min_lng, max_lng, min_lat, max_lat }
  }

  pub fn contains(&self, p: &GeoPoint) -> bool {
    (self.min_lng..=self.max_lng).contains(&p.lng)
      && (self.min_lat..=self.max_lat).contains(&p.lat)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_rejects_out_of_range() {
    assert!(matches!(GeoPoint::new(-94.16, 91.0), Err(Error::LatitudeOutOfRange(_))));
    assert!(matches!(GeoPoint::new(180.5, 45.0), Err(Error::LongitudeOutOfRange(_))));
    assert!(matches!(GeoPoint::new(f64::NAN, 0.0), Err(Error::NonFiniteCoordinate)));
    assert!(GeoPoint::new(180.0, -90.0).is_ok());
  }

  #[test]
  fn serialises_longitude_first() {
    let p = GeoPoint::new(-94.1632, 45.5579).unwrap();
    let json = serde_json::to_value(p).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "type": "Point", "coordinates": [-94.1632, 45.5579] })
    );
  }

  #[test]
  fn deserialise_validates() {
    let bad: std::result::Result<GeoPoint, _> = serde_json::from_value(
      serde_json::json!({ "type": "Point", "coordinates": [10.0, 120.0] }),
    );
    assert!(bad.is_err());

    let short: std::result::Result<GeoPoint, _> =
      serde_json::from_value(serde_json::json!({ "type": "Point", "coordinates": [10.0] }));
    assert!(short.is_err());

    let polygon: std::result::Result<GeoPoint, _> = serde_json::from_value(
      serde_json::json!({ "type": "Polygon", "coordinates": [10.0, 20.0] }),
    );
    assert!(polygon.is_err());
  }

  #[test]
  fn haversine_same_point_is_zero() {
    assert_eq!(haversine_m(45.5579, -94.1632, 45.5579, -94.1632), 0.0);
  }

  #[test]
  fn haversine_one_degree_of_longitude_at_equator() {
    let d = haversine_m(0.0, 0.0, 0.0, 1.0);
    assert!((d - 111_195.0).abs() < 111_195.0 * 0.01, "got {d}");
  }

  #[test]
  fn distance_to_uses_lng_lat_order() {
    let a = GeoPoint::new(0.0, 0.0).unwrap();
    let b = GeoPoint::new(0.0, 1.0).unwrap();
    let d = a.distance_to(&b);
    assert!((d - 111_195.0).abs() < 1_200.0, "got {d}");
  }

  #[test]
  fn bounding_box_contains_circle() {
    let c = GeoPoint::new(-94.1632, 45.5579).unwrap();
    let bbox = BoundingBox::around(c, 1_000.0);
    assert!(bbox.contains(&c));
    // ~900 m north and ~900 m east stay inside.
    let north = GeoPoint::new(c.lng(), c.lat() + 0.0081).unwrap();
    let east = GeoPoint::new(c.lng() + 0.0115, c.lat()).unwrap();
    assert!(bbox.contains(&north));
    assert!(bbox.contains(&east));
    let far = GeoPoint::new(c.lng(), c.lat() + 0.1).unwrap();
    assert!(!bbox.contains(&far));
  }

  #[test]
  fn bounding_box_widens_across_antimeridian() {
    let c = GeoPoint::new(179.999, 10.0).unwrap();
    let bbox = BoundingBox::around(c, 5_000.0);
    assert_eq!((bbox.min_lng, bbox.max_lng), (-180.0, 180.0));
  }
}
