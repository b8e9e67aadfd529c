//! HTTP server assembly for the sightings service: configuration, the
//! middleware stack around [`sightings_api::api_router`], and shutdown
//! signalling.

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{Context as _, anyhow};
use axum::Router;
use config::{ConfigBuilder, builder::DefaultState};
use serde::Deserialize;
use sightings_core::store::SightingStore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, read from an optional TOML file and
/// `SIGHTINGS_*` environment variables (the latter win).
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  /// Store connection string, e.g. `sqlite://sightings.db`. Never committed;
  /// supply it through the environment or an untracked config file.
  pub database_url:       Option<String>,
  /// Bounded wait on a busy database before a request fails.
  #[serde(default = "default_connect_timeout_ms")]
  pub connect_timeout_ms: u64,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 3000 }

fn default_connect_timeout_ms() -> u64 { 10_000 }

impl ServerConfig {
  /// Layer `path` (optional) under the environment and deserialise.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("SIGHTINGS")),
    )
  }

  pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
    builder
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  /// The store connection string. Its absence is fatal: the server refuses
  /// to start without a database.
  pub fn database_url(&self) -> anyhow::Result<&str> {
    self
      .database_url
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .ok_or_else(|| anyhow!("missing database_url (set SIGHTINGS_DATABASE_URL)"))
  }

  pub fn connect_timeout(&self) -> Duration { Duration::from_millis(self.connect_timeout_ms) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: API under `/api`, request tracing, permissive CORS
/// for the browser map client.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: SightingStore + 'static,
{
  Router::new()
    .nest("/api", sightings_api::api_router(store))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

// ─── Shutdown ─────────────────────────────────────────────────────────────────

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => tracing::info!("Ctrl-C received, shutting down"),
    _ = terminate => tracing::info!("SIGTERM received, shutting down"),
  }
}
