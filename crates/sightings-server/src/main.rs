//! sightings-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `SIGHTINGS_*` environment variables, connects the store once, and serves
//! the JSON API until Ctrl-C or SIGTERM.
//!
//! ```text
//! SIGHTINGS_DATABASE_URL=sqlite://sightings.db cargo run -p sightings-server
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use sightings_server::{ServerConfig, app, shutdown_signal};
use sightings_store_sqlite::Database;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sightings ingestion and retrieval server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  // No database, no server.
  let database = Database::new(server_cfg.database_url()?, server_cfg.connect_timeout())
    .context("invalid database_url")?;
  let store = database
    .connect()
    .await
    .with_context(|| format!("failed to open store at {:?}", database.location()))?
    .clone();

  let address = server_cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app(Arc::new(store)))
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  database.shutdown().await.context("failed to close store")?;
  Ok(())
}
