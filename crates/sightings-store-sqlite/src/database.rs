//! Process-wide store handle with an explicit connect/shutdown lifecycle.
//!
//! The server builds one [`Database`] at startup. [`Database::connect`] opens
//! the store the first time it is called and hands out the same connection on
//! every later call; [`Database::shutdown`] is the single teardown path.

use std::{path::PathBuf, time::Duration};

use tokio::sync::OnceCell;

use crate::{store::SqliteStore, Error, Result};

// ─── Location ────────────────────────────────────────────────────────────────

/// Where the store lives, parsed from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
  Memory,
  File(PathBuf),
}

impl StoreLocation {
  /// Accepts `sqlite::memory:`, `:memory:`, `sqlite://<path>`,
  /// `sqlite:<path>`, or a bare filesystem path.
  pub fn parse(url: &str) -> Result<Self> {
    let url = url.trim();
    let rest = url
      .strip_prefix("sqlite://")
      .or_else(|| url.strip_prefix("sqlite:"))
      .unwrap_or(url);

    match rest {
      "" => Err(Error::InvalidDatabaseUrl(url.to_owned())),
      ":memory:" => Ok(Self::Memory),
      path => Ok(Self::File(PathBuf::from(path))),
    }
  }
}

// ─── Database ────────────────────────────────────────────────────────────────

pub struct Database {
  location:     StoreLocation,
  busy_timeout: Duration,
  store:        OnceCell<SqliteStore>,
}

impl Database {
  pub fn new(url: &str, busy_timeout: Duration) -> Result<Self> {
    Ok(Self {
      location: StoreLocation::parse(url)?,
      busy_timeout,
      store: OnceCell::new(),
    })
  }

  pub fn location(&self) -> &StoreLocation { &self.location }

  /// Open the store if it is not open yet; otherwise return the existing one.
  pub async fn connect(&self) -> Result<&SqliteStore> {
    self
      .store
      .get_or_try_init(|| async {
        let store = match &self.location {
          StoreLocation::Memory => SqliteStore::open_in_memory_with(self.busy_timeout).await?,
          StoreLocation::File(path) => SqliteStore::open(path, self.busy_timeout).await?,
        };
        tracing::info!(location = ?self.location, "store connected");
        Ok::<_, Error>(store)
      })
      .await
  }

  pub fn is_connected(&self) -> bool { self.store.initialized() }

  /// Close the connection if one was opened.
  pub async fn shutdown(self) -> Result<()> {
    if let Some(store) = self.store.into_inner() {
      store.close().await?;
      tracing::info!("store connection closed");
    }
    Ok(())
  }
}
