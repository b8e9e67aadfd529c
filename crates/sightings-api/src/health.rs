//! Handler for `GET /health`.

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

/// Liveness probe; never touches the store.
pub async fn handler() -> Json<Value> {
  Json(json!({
    "status":    "ok",
    "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
  }))
}
