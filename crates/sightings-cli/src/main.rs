//! `sightings` — command-line client for the sightings service.
//!
//! # Usage
//!
//! ```text
//! sightings report --lat 45.5579 --lng -94.1632 --description "red cape"
//! sightings latest
//! sightings recent --minutes 30
//! sightings distance --lat 45.56 --lng -94.15
//! ```

mod client;

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, Report};
use serde::Deserialize;
use sightings_core::geo::GeoPoint;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sightings", about = "Report and query sightings")]
struct Args {
  /// Path to a TOML config file (`base_url`).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the sightings server (default: http://localhost:3000).
  #[arg(long, env = "SIGHTINGS_API_BASE")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Report a new sighting.
  Report {
    #[arg(long, allow_hyphen_values = true)]
    lat:         f64,
    #[arg(long, allow_hyphen_values = true)]
    lng:         f64,
    /// Accuracy radius in metres.
    #[arg(long)]
    accuracy:    Option<f64>,
    #[arg(long)]
    description: Option<String>,
    /// Observation time (RFC 3339); defaults to the server's receipt time.
    #[arg(long)]
    when:        Option<DateTime<Utc>>,
  },
  /// Show the latest approved sighting.
  Latest,
  /// List recent approved sightings, newest first.
  Recent {
    #[arg(long)]
    minutes: Option<f64>,
  },
  /// Distance from a position to the latest sighting.
  Distance {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  base_url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.base_url.is_empty()).then(|| file_cfg.base_url.clone()))
      .unwrap_or_else(|| "http://localhost:3000".to_string()),
  };
  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Report { lat, lng, accuracy, description, when } => {
      let id = client
        .report(&Report { lat, lng, timestamp: when, accuracy_m: accuracy, description })
        .await?;
      println!("{id}");
    }
    Command::Latest => {
      let latest = client.latest().await?;
      println!("{}", serde_json::to_string_pretty(&latest)?);
    }
    Command::Recent { minutes } => {
      let items = client.recent(minutes).await?;
      println!("{}", serde_json::to_string_pretty(&items)?);
    }
    Command::Distance { lat, lng } => {
      let me = GeoPoint::new(lng, lat).context("invalid position")?;
      // A bad or unexpected response is reported, not fatal.
      match client.distance_to_latest(me).await {
        Ok(Some(m)) => println!("{}", format_distance(m)),
        Ok(None) => println!("no sightings yet"),
        Err(e) => {
          eprintln!("could not compare with the latest sighting: {e:#}");
          return Ok(ExitCode::FAILURE);
        }
      }
    }
  }

  Ok(ExitCode::SUCCESS)
}

fn format_distance(m: f64) -> String {
  if m < 1_000.0 {
    format!("{m:.0} m from the latest sighting")
  } else {
    format!("{:.2} km from the latest sighting", m / 1_000.0)
  }
}
