//! The create-request adapter.
//!
//! Two body shapes reach `POST /sightings`:
//!
//! - client form: `{ lat, lng, timestamp?, accuracyM?, description? }`
//! - storage form: `{ when?, loc: { type: "Point", coordinates: [lng, lat] },
//!   accuracyM?, description? }`
//!
//! Both deserialise into [`SightingPayload`] and go through the one
//! translation, [`SightingPayload::into_new_sighting`]. When both `loc` and
//! `lat`/`lng` are present, `loc` wins.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use sightings_core::{Error, Result, geo::GeoPoint, sighting::NewSighting};

/// Loosely-typed create body. Every field is kept as raw JSON so that type
/// mismatches surface as validation errors or defaults, never as rejections.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingPayload {
  pub lat:         Option<Value>,
  pub lng:         Option<Value>,
  pub timestamp:   Option<Value>,
  pub when:        Option<Value>,
  pub loc:         Option<Value>,
  pub accuracy_m:  Option<Value>,
  pub description: Option<Value>,
}

impl SightingPayload {
  pub fn into_new_sighting(self) -> Result<NewSighting> {
    let location = match non_null(self.loc) {
      Some(loc) => parse_loc(&loc)?,
      None => parse_lat_lng(non_null(self.lat), non_null(self.lng))?,
    };

    let observed_at = given_timestamp(self.when)
      .or_else(|| given_timestamp(self.timestamp))
      .map(|v| parse_timestamp(&v))
      .transpose()?;

    Ok(NewSighting {
      location,
      observed_at,
      // Anything that is not a JSON number falls back to the default.
      accuracy_m: self.accuracy_m.as_ref().and_then(Value::as_f64),
      description: match self.description {
        Some(Value::String(s)) => Some(s),
        _ => None,
      },
    })
  }
}

fn non_null(v: Option<Value>) -> Option<Value> { v.filter(|v| !v.is_null()) }

/// `null`, `""`, `0` and `false` mean "not given": the receipt time is used.
fn given_timestamp(v: Option<Value>) -> Option<Value> {
  non_null(v).filter(|v| match v {
    Value::String(s) => !s.is_empty(),
    Value::Number(n) => n.as_f64() != Some(0.0),
    Value::Bool(b) => *b,
    _ => true,
  })
}

/// A coordinate may arrive as a JSON number or a numeric string (HTML forms).
fn coordinate(v: &Value, name: &str) -> Result<f64> {
  let parsed = match v {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  parsed.ok_or_else(|| Error::MalformedLocation(format!("{name} is not a number")))
}

fn parse_lat_lng(lat: Option<Value>, lng: Option<Value>) -> Result<GeoPoint> {
  match (lat, lng) {
    (Some(lat), Some(lng)) => {
      GeoPoint::new(coordinate(&lng, "lng")?, coordinate(&lat, "lat")?)
    }
    _ => Err(Error::MissingLocation),
  }
}

fn parse_loc(loc: &Value) -> Result<GeoPoint> {
  let obj = loc
    .as_object()
    .ok_or_else(|| Error::MalformedLocation("loc must be an object".into()))?;

  match obj.get("type").and_then(Value::as_str) {
    Some("Point") => {}
    _ => return Err(Error::MalformedLocation("loc.type must be \"Point\"".into())),
  }

  let coords = obj
    .get("coordinates")
    .and_then(Value::as_array)
    .ok_or_else(|| Error::MalformedLocation("loc.coordinates must be an array".into()))?;

  match coords.as_slice() {
    [lng, lat] => GeoPoint::new(
      coordinate(lng, "coordinates[0]")?,
      coordinate(lat, "coordinates[1]")?,
    ),
    other => Err(Error::MalformedLocation(format!(
      "loc.coordinates must be [lng, lat], got {} values",
      other.len()
    ))),
  }
}

/// RFC 3339 strings or epoch milliseconds.
fn parse_timestamp(v: &Value) -> Result<DateTime<Utc>> {
  match v {
    Value::String(s) => DateTime::parse_from_rfc3339(s)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|e| Error::InvalidTimestamp(format!("{s:?}: {e}"))),
    Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
      .and_then(DateTime::from_timestamp_millis)
      .ok_or_else(|| Error::InvalidTimestamp(n.to_string())),
    other => Err(Error::InvalidTimestamp(other.to_string())),
  }
}
