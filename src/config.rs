//! # Configuration Module
//!
//! Runtime configuration and data directory management. The play history
//! database lives in the platform-standard data directory:
//!
//! - Linux: `~/.local/share/rotation/history.db`
//! - macOS: `~/Library/Application Support/rotation/history.db`
//! - Windows: `%APPDATA%\rotation\history.db`
//!
//! MPD connection settings default to `localhost:6600` and can be overridden
//! on the command line or through the `MPD_HOST`/`MPD_PORT` environment
//! variables (handled by clap, see [`crate::cli`]).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default delay between poll cycles of the watch loop.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Returns the rotation data directory, creating it if necessary.
///
/// # Errors
///
/// Fails if the platform data directory cannot be determined or the
/// subdirectory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .context("could not determine the system data directory for this platform")?;

    let dir = base.join("rotation");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory at {}", dir.display()))?;

    Ok(dir)
}

/// Returns the default path of the play history database.
///
/// # Errors
///
/// Fails if the data directory cannot be resolved or created.
pub fn default_db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("history.db"))
}

/// Resolved runtime settings for one process invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// MPD host name or address.
    pub mpd_host: String,
    /// MPD TCP port.
    pub mpd_port: u16,
    /// Path to the SQLite play history database.
    pub db_path: PathBuf,
    /// Delay between poll cycles.
    pub poll_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mpd_host: "localhost".to_string(),
            mpd_port: 6600,
            db_path: default_db_path().unwrap_or_else(|_| PathBuf::from("history.db")),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl RuntimeConfig {
    /// Build a configuration from explicit settings, falling back to the
    /// default database location when none is given.
    ///
    /// # Errors
    ///
    /// Fails if no database path was supplied and the default location
    /// cannot be resolved.
    pub fn resolve(
        host: String,
        port: u16,
        db_path: Option<PathBuf>,
        interval_ms: u64,
    ) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => default_db_path()?,
        };

        Ok(Self {
            mpd_host: host,
            mpd_port: port,
            db_path,
            poll_interval: Duration::from_millis(interval_ms),
        })
    }
}
