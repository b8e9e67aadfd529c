//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("validation failed: {0}")]
  Validation(#[from] sightings_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::Validation(e) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": e.code(), "message": e.to_string() })),
      )
        .into_response(),
      // Store details stay in the server log.
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store operation failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "Server error" })),
        )
          .into_response()
      }
    }
  }
}
