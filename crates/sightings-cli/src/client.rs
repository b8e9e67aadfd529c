//! Async HTTP client wrapping the sightings JSON API, plus the client-side
//! distance-to-latest computation.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use sightings_core::geo::GeoPoint;
use uuid::Uuid;

/// Connection settings for the sightings API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Body for `POST /api/sightings`, in client form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  pub lat:         f64,
  pub lng:         f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timestamp:   Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub accuracy_m:  Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// Async HTTP client for the sightings JSON API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `POST /api/sightings` — returns the new sighting's id.
  pub async fn report(&self, report: &Report) -> Result<Uuid> {
    let resp = self
      .client
      .post(self.url("/sightings"))
      .json(report)
      .send()
      .await
      .context("POST /sightings failed")?;

    let status = resp.status();
    if !status.is_success() {
      let text = resp.text().await.unwrap_or_default();
      return Err(anyhow!("POST /sightings → {status}: {}", error_reason(&text)));
    }

    let body: Value = resp.json().await.context("reading POST /sightings response")?;
    body
      .get("id")
      .and_then(Value::as_str)
      .ok_or_else(|| anyhow!("POST /sightings: response has no id"))?
      .parse()
      .context("POST /sightings: id is not a UUID")
  }

  /// `GET /api/sightings/latest` — raw JSON, `null` when there is none.
  pub async fn latest(&self) -> Result<Value> {
    let resp = self
      .client
      .get(self.url("/sightings/latest"))
      .send()
      .await
      .context("GET /sightings/latest failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /sightings/latest → {}", resp.status()));
    }
    resp.json().await.context("deserialising latest sighting")
  }

  /// `GET /api/sightings?minutes=<n>`
  pub async fn recent(&self, minutes: Option<f64>) -> Result<Vec<Value>> {
    let mut req = self.client.get(self.url("/sightings"));
    if let Some(m) = minutes {
      req = req.query(&[("minutes", m.to_string())]);
    }
    let resp = req.send().await.context("GET /sightings failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /sightings → {}", resp.status()));
    }
    resp.json().await.context("deserialising recent sightings")
  }

  /// Distance in metres from `me` to the latest sighting, or `None` if there
  /// is no sighting yet.
  pub async fn distance_to_latest(&self, me: GeoPoint) -> Result<Option<f64>> {
    let latest = self.latest().await?;
    Ok(latest_location(&latest)?.map(|p| me.distance_to(&p)))
  }
}

/// The `message` (or `error`) of a JSON error body, else the raw text.
fn error_reason(text: &str) -> String {
  let reason = serde_json::from_str::<Value>(text).ok().and_then(|body| {
    body
      .get("message")
      .or_else(|| body.get("error"))
      .and_then(Value::as_str)
      .map(str::to_owned)
  });
  reason.unwrap_or_else(|| text.trim().to_owned())
}

/// Pull the `[lng, lat]` pair out of a latest-sighting document.
///
/// `null` means "no sightings"; any other shape that lacks a usable location
/// is an error for the caller to report.
pub fn latest_location(doc: &Value) -> Result<Option<GeoPoint>> {
  if doc.is_null() {
    return Ok(None);
  }

  let coords = doc
    .get("loc")
    .and_then(|loc| loc.get("coordinates"))
    .and_then(Value::as_array)
    .ok_or_else(|| anyhow!("unexpected response: no loc.coordinates"))?;

  let [lng, lat] = coords.as_slice() else {
    bail!("unexpected response: coordinates has {} values", coords.len());
  };
  let (Some(lng), Some(lat)) = (lng.as_f64(), lat.as_f64()) else {
    bail!("unexpected response: non-numeric coordinates");
  };

  Ok(Some(GeoPoint::new(lng, lat).context("unexpected response: invalid coordinates")?))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn latest_location_reads_lng_then_lat() {
    let doc = json!({
      "id": "3f1c0e9e-8a0c-4d0b-9a53-0c7b7f8f5f10",
      "loc": { "type": "Point", "coordinates": [-94.1632, 45.5579] },
      "accuracyM": 20
    });
    let p = latest_location(&doc).unwrap().unwrap();
    assert_eq!(p.lng(), -94.1632);
    assert_eq!(p.lat(), 45.5579);
  }

  #[test]
  fn null_means_no_sighting() {
    assert!(latest_location(&Value::Null).unwrap().is_none());
  }

  #[test]
  fn unexpected_shapes_are_errors_not_panics() {
    for doc in [
      json!({ "error": "Server error" }),
      json!([]),
      json!({ "loc": { "coordinates": [1.0] } }),
      json!({ "loc": { "coordinates": ["a", "b"] } }),
      json!({ "loc": { "coordinates": [0.0, 95.0] } }),
    ] {
      assert!(latest_location(&doc).is_err(), "{doc}");
    }
  }

  #[test]
  fn distance_from_same_point_is_zero() {
    let doc = json!({ "loc": { "type": "Point", "coordinates": [-94.1632, 45.5579] } });
    let latest = latest_location(&doc).unwrap().unwrap();
    let me = GeoPoint::new(-94.1632, 45.5579).unwrap();
    assert_eq!(me.distance_to(&latest), 0.0);
  }

  #[test]
  fn report_serialises_client_form() {
    let r = Report {
      lat:         45.0,
      lng:         -94.0,
      timestamp:   None,
      accuracy_m:  Some(15.0),
      description: None,
    };
    assert_eq!(
      serde_json::to_value(&r).unwrap(),
      json!({ "lat": 45.0, "lng": -94.0, "accuracyM": 15.0 })
    );
  }

  #[test]
  fn error_reason_prefers_message_and_tolerates_non_json() {
    assert_eq!(
      error_reason(r#"{"error":"invalid_location","message":"latitude 91 out of range"}"#),
      "latitude 91 out of range"
    );
    assert_eq!(error_reason(r#"{"error":"Server error"}"#), "Server error");
    assert_eq!(error_reason("<html>502 Bad Gateway</html>\n"), "<html>502 Bad Gateway</html>");
    assert_eq!(error_reason(""), "");
  }

  #[test]
  fn url_joins_base_and_api_prefix() {
    let c = ApiClient::new(ApiConfig { base_url: "http://localhost:3000/".into() }).unwrap();
    assert_eq!(c.url("/sightings/latest"), "http://localhost:3000/api/sightings/latest");
  }
}
