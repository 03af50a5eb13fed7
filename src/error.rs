//! Crate-wide error taxonomy.
//!
//! Failures fall into three classes with different blast radii:
//!
//! - [`Error::Connection`] - MPD is unreachable or the history database
//!   cannot be opened. Fatal; the process exits during startup.
//! - [`Error::Query`] - a store statement failed mid-operation. Non-fatal;
//!   the single play event is dropped and the watch loop continues.
//! - [`Error::Playback`] - an MPD command failed during a playlist rebuild.
//!   Non-fatal; only the current playlist's rebuild is abandoned.

use thiserror::Error;

/// Result type used throughout the library modules.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type covering every failure the watch loop can encounter.
#[derive(Error, Debug)]
pub enum Error {
    /// MPD handshake failed or the database could not be opened/initialized.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A store statement failed (wraps `rusqlite::Error`).
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// MPD rejected or dropped a command during a playlist rebuild.
    #[error("mpd command failed: {0}")]
    Playback(String),

    /// Socket-level I/O failure while talking to MPD.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures that should abort startup rather than be skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}
