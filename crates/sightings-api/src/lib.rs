//! JSON REST API for the sightings service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`sightings_core::store::SightingStore`]. CORS, tracing and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sightings_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod health;
pub mod payload;
pub mod sightings;

use std::sync::Arc;

use axum::{Router, routing::get};
use sightings_core::store::SightingStore;

pub use error::ApiError;
pub use payload::SightingPayload;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SightingStore + 'static,
{
  Router::new()
    .route("/health", get(health::handler))
    .route("/sightings", get(sightings::recent::<S>).post(sightings::create::<S>))
    .route("/sightings/latest", get(sightings::latest::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{TimeDelta, Utc};
  use serde_json::{Value, json};
  use sightings_core::{
    geo::GeoPoint,
    sighting::{NewSighting, Sighting},
    store::{NearQuery, RecentQuery, SightingStore},
  };
  use sightings_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn make_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  fn app<S: SightingStore + 'static>(store: Arc<S>) -> Router {
    Router::new().nest("/api", api_router(store))
  }

  async fn send(
    router: Router,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = router.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  // ── Health ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_reports_ok() {
    let (status, body) = send(app(make_store().await), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
  }

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_client_form_then_latest() {
    let store = make_store().await;
    let (status, body) = send(
      app(store.clone()),
      "POST",
      "/api/sightings",
      Some(json!({ "lat": 45.5579, "lng": -94.1632, "description": "cape spotted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let id = body["id"].as_str().unwrap().to_owned();

    let (status, latest) = send(app(store), "GET", "/api/sightings/latest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["id"], id);
    assert_eq!(latest["loc"]["type"], "Point");
    assert_eq!(latest["loc"]["coordinates"], json!([-94.1632, 45.5579]));
    assert_eq!(latest["accuracyM"], 20.0);
    assert_eq!(latest["status"], "approved");
    assert_eq!(latest["description"], "cape spotted");
  }

  #[tokio::test]
  async fn empty_timestamp_uses_receipt_time() {
    let store = make_store().await;
    let before = Utc::now() - TimeDelta::seconds(1);
    let (status, _) = send(
      app(store.clone()),
      "POST",
      "/api/sightings",
      Some(json!({ "lat": 45.5579, "lng": -94.1632, "timestamp": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let latest = store.find_latest_approved().await.unwrap().unwrap();
    assert!(latest.observed_at >= before);
  }

  #[tokio::test]
  async fn create_storage_form() {
    let store = make_store().await;
    let when = (Utc::now() - TimeDelta::minutes(2)).to_rfc3339();
    let (status, _) = send(
      app(store.clone()),
      "POST",
      "/api/sightings",
      Some(json!({
        "when": when,
        "loc": { "type": "Point", "coordinates": [-94.1632, 45.5579] },
        "accuracyM": 250
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let latest = store.find_latest_approved().await.unwrap().unwrap();
    assert_eq!(latest.accuracy_m, 250.0);
    assert_eq!(latest.location.coordinates(), [-94.1632, 45.5579]);
  }

  #[tokio::test]
  async fn invalid_coordinates_return_400_without_writing() {
    let store = make_store().await;

    for body in [
      json!({ "lat": 120, "lng": 0 }),
      json!({ "lat": 0, "lng": 200 }),
      json!({ "lng": -94.0 }),
      json!({ "description": "nowhere" }),
      json!({ "loc": { "type": "Point", "coordinates": [1] } }),
    ] {
      let (status, resp) =
        send(app(store.clone()), "POST", "/api/sightings", Some(body.clone())).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
      assert_eq!(resp["error"], "invalid_location");
    }

    assert_eq!(store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn malformed_json_returns_400() {
    let store = make_store().await;
    let req = Request::builder()
      .method("POST")
      .uri("/api/sightings")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let resp = app(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn non_numeric_accuracy_defaults_to_20() {
    let store = make_store().await;
    let (status, _) = send(
      app(store.clone()),
      "POST",
      "/api/sightings",
      Some(json!({ "lat": 45.0, "lng": -94.0, "accuracyM": "very" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let latest = store.find_latest_approved().await.unwrap().unwrap();
    assert_eq!(latest.accuracy_m, 20.0);
  }

  // ── Latest ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn latest_on_empty_store_is_null() {
    let (status, body) =
      send(app(make_store().await), "GET", "/api/sightings/latest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
  }

  // ── Recent ──────────────────────────────────────────────────────────────────

  async fn seed(store: &SqliteStore, minutes_ago: &[i64]) {
    let now = Utc::now();
    for m in minutes_ago {
      store
        .create(
          NewSighting::new(GeoPoint::new(-94.1632, 45.5579).unwrap())
            .observed_at(now - TimeDelta::minutes(*m)),
        )
        .await
        .unwrap();
    }
  }

  #[tokio::test]
  async fn recent_uses_minutes_parameter() {
    let store = make_store().await;
    seed(&store, &[10, 5, 1]).await;

    let (status, body) = send(app(store), "GET", "/api/sightings?minutes=8", None).await;
    assert_eq!(status, StatusCode::OK);
    let items: Vec<Sighting> = serde_json::from_value(body).unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0].observed_at > items[1].observed_at);
  }

  #[tokio::test]
  async fn recent_defaults_to_120_minutes() {
    let store = make_store().await;
    seed(&store, &[200, 119, 30]).await;

    let (_, body) = send(app(store.clone()), "GET", "/api/sightings", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Garbage falls back to the default instead of failing.
    let (status, body) = send(app(store), "GET", "/api/sightings?minutes=lots", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
  }

  #[test]
  fn window_minutes_parsing() {
    assert_eq!(sightings::window_minutes(None), 120.0);
    assert_eq!(sightings::window_minutes(Some("60")), 60.0);
    assert_eq!(sightings::window_minutes(Some(" 7.5 ")), 7.5);
    assert_eq!(sightings::window_minutes(Some("-5")), 120.0);
    assert_eq!(sightings::window_minutes(Some("NaN")), 120.0);
    assert_eq!(sightings::window_minutes(Some("abc")), 120.0);
  }

  // ── Store failures ──────────────────────────────────────────────────────────

  /// A store whose every operation fails, for exercising the 500 path.
  struct BrokenStore;

  fn broken() -> std::io::Error {
    std::io::Error::other("connection refused: secret-host:27017")
  }

  impl SightingStore for BrokenStore {
    type Error = std::io::Error;

    async fn create(&self, _input: NewSighting) -> Result<Sighting, Self::Error> {
      Err(broken())
    }

    async fn find_latest_approved(&self) -> Result<Option<Sighting>, Self::Error> {
      Err(broken())
    }

    async fn find_recent(&self, _query: RecentQuery) -> Result<Vec<Sighting>, Self::Error> {
      Err(broken())
    }

    async fn find_near(&self, _query: NearQuery) -> Result<Vec<Sighting>, Self::Error> {
      Err(broken())
    }

    async fn count(&self) -> Result<u64, Self::Error> { Err(broken()) }
  }

  #[tokio::test]
  async fn store_failures_return_generic_500() {
    let store = Arc::new(BrokenStore);

    let (status, body) = send(
      app(store.clone()),
      "POST",
      "/api/sightings",
      Some(json!({ "lat": 1.0, "lng": 2.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Server error" }));

    let (status, body) = send(app(store.clone()), "GET", "/api/sightings/latest", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("secret-host"));

    let (status, _) = send(app(store), "GET", "/api/sightings", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  }
}
