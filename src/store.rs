//! # Play History Store
//!
//! SQLite-backed store for the deduplicated entity tables (artist, album,
//! song) and the append-only play log. All four tables are owned exclusively
//! by [`Store`]; rows are created lazily on first reference and never updated
//! or deleted.
//!
//! Deduplication works through get-or-create: each entity is looked up by its
//! unique key and inserted only on a miss. No transaction spans the
//! lookup-then-insert pair - the watch loop is the only writer, which is what
//! makes this safe. Adding a second writer would require wrapping each
//! get-or-create in a real transaction.
//!
//! Songs are keyed by MPD's own song id (`mpd_id`), so retitled or retagged
//! tracks with the same id never produce duplicate rows.

use crate::error::{Error, Result};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

/// Schema creation is idempotent and runs once per process at open.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS artists(
        id   INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS albums(
        id        INTEGER PRIMARY KEY,
        artist_id INTEGER NOT NULL REFERENCES artists(id),
        name      TEXT NOT NULL,
        UNIQUE(artist_id, name),
        CHECK(artist_id > 0)
    );
    CREATE TABLE IF NOT EXISTS songs(
        id       INTEGER PRIMARY KEY,
        album_id INTEGER NOT NULL REFERENCES albums(id),
        name     TEXT NOT NULL,
        mpd_id   INTEGER NOT NULL UNIQUE,
        UNIQUE(album_id, name),
        CHECK(album_id > 0)
    );
    CREATE TABLE IF NOT EXISTS plays(
        time    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        song_id INTEGER REFERENCES songs(id)
    );
";

/// Metadata of the track MPD reports as currently playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// MPD's stable identifier for this queue entry.
    pub mpd_id: u32,
}

/// Owns the history database connection and all four tables.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the history database at `path` and ensure the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the file cannot be opened or the
    /// schema cannot be created; this is a fatal startup condition.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::Connection(format!("cannot open {}: {e}", path.display())))?;

        Self::from_connection(conn)
    }

    /// In-memory store, used by tests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if SQLite cannot create the database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Connection(format!("cannot open in-memory db: {e}")))?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::Connection(format!("schema init failed: {e}")))?;
        debug!("history schema ready");

        Ok(Self { conn })
    }

    /// Read access for the ranking queries and tests. Writes stay inside
    /// this module.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Record one play of `track`, creating artist/album/song rows on first
    /// sight. Returns the song's row id.
    ///
    /// Repeated plays of the same track add play rows only; repeated
    /// metadata never duplicates entity rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if any statement fails. The caller drops the
    /// event; nothing is retried.
    pub fn record_play(&self, track: &Track) -> Result<i64> {
        let song_id = match self.lookup_song(track.mpd_id)? {
            Some(id) => id,
            None => {
                let artist_id = self.get_or_create_artist(&track.artist)?;
                let album_id = self.get_or_create_album(artist_id, &track.album)?;
                self.insert_song(album_id, &track.title, track.mpd_id)?
            }
        };

        self.conn
            .execute("INSERT INTO plays (song_id) VALUES (?1)", [song_id])?;
        info!(
            "recorded play: {} by {} from {}",
            track.title, track.artist, track.album
        );

        Ok(song_id)
    }

    fn lookup_song(&self, mpd_id: u32) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT id FROM songs WHERE mpd_id = ?1", [mpd_id], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(id)
    }

    fn get_or_create_artist(&self, name: &str) -> Result<i64> {
        let existing = self
            .conn
            .query_row("SELECT id FROM artists WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn
            .execute("INSERT INTO artists (name) VALUES (?1)", [name])?;
        debug!("new artist: {name}");
        Ok(self.conn.last_insert_rowid())
    }

    fn get_or_create_album(&self, artist_id: i64, name: &str) -> Result<i64> {
        let existing = self
            .conn
            .query_row(
                "SELECT id FROM albums WHERE artist_id = ?1 AND name = ?2",
                rusqlite::params![artist_id, name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO albums (artist_id, name) VALUES (?1, ?2)",
            rusqlite::params![artist_id, name],
        )?;
        debug!("new album: {name}");
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_song(&self, album_id: i64, title: &str, mpd_id: u32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO songs (album_id, name, mpd_id) VALUES (?1, ?2, ?3)",
            rusqlite::params![album_id, title, mpd_id],
        )?;
        debug!("new song: {title}");
        Ok(self.conn.last_insert_rowid())
    }
}
