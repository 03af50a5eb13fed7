//! # Ranking Engine
//!
//! Read-only aggregation queries over the play log, producing ordered name
//! lists per entity kind. Two shapes exist: *recent* ranks groups by their
//! latest play timestamp, *frequent* by total play count.
//!
//! Each query groups plays by display name, joining transitively through
//! song, album and artist as the kind requires. Groups with no plays never
//! appear (inner joins). Ordering is fully deterministic: the metric
//! descends, and equal metrics fall back to the grouped name ascending.

use crate::error::Result;
use crate::mpd::Tag;
use crate::store::Store;

const SQL_RECENT_ARTISTS: &str = "
    SELECT name FROM (
        SELECT artists.name AS name, MAX(plays.time) AS last_played
        FROM plays
        JOIN songs ON songs.id = plays.song_id
        JOIN albums ON albums.id = songs.album_id
        JOIN artists ON artists.id = albums.artist_id
        GROUP BY artists.name
    )
    ORDER BY last_played DESC, name ASC
    LIMIT 10";

const SQL_RECENT_ALBUMS: &str = "
    SELECT name FROM (
        SELECT albums.name AS name, MAX(plays.time) AS last_played
        FROM plays
        JOIN songs ON songs.id = plays.song_id
        JOIN albums ON albums.id = songs.album_id
        GROUP BY albums.name
    )
    ORDER BY last_played DESC, name ASC
    LIMIT 10";

const SQL_RECENT_SONGS: &str = "
    SELECT name FROM (
        SELECT songs.name AS name, MAX(plays.time) AS last_played
        FROM plays
        JOIN songs ON songs.id = plays.song_id
        GROUP BY songs.name
    )
    ORDER BY last_played DESC, name ASC
    LIMIT 10";

const SQL_FREQUENT_ARTISTS: &str = "
    SELECT name FROM (
        SELECT artists.name AS name, COUNT(*) AS play_count
        FROM plays
        JOIN songs ON songs.id = plays.song_id
        JOIN albums ON albums.id = songs.album_id
        JOIN artists ON artists.id = albums.artist_id
        GROUP BY artists.name
    )
    ORDER BY play_count DESC, name ASC
    LIMIT 10";

const SQL_FREQUENT_ALBUMS: &str = "
    SELECT name FROM (
        SELECT albums.name AS name, COUNT(*) AS play_count
        FROM plays
        JOIN songs ON songs.id = plays.song_id
        JOIN albums ON albums.id = songs.album_id
        GROUP BY albums.name
    )
    ORDER BY play_count DESC, name ASC
    LIMIT 10";

const SQL_FREQUENT_SONGS: &str = "
    SELECT name FROM (
        SELECT songs.name AS name, COUNT(*) AS play_count
        FROM plays
        JOIN songs ON songs.id = plays.song_id
        GROUP BY songs.name
    )
    ORDER BY play_count DESC, name ASC
    LIMIT 100";

/// The closed set of ranking queries a playlist can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    RecentArtists,
    RecentAlbums,
    RecentSongs,
    FrequentArtists,
    FrequentAlbums,
    FrequentSongs,
}

impl Ranking {
    fn sql(self) -> &'static str {
        match self {
            Ranking::RecentArtists => SQL_RECENT_ARTISTS,
            Ranking::RecentAlbums => SQL_RECENT_ALBUMS,
            Ranking::RecentSongs => SQL_RECENT_SONGS,
            Ranking::FrequentArtists => SQL_FREQUENT_ARTISTS,
            Ranking::FrequentAlbums => SQL_FREQUENT_ALBUMS,
            Ranking::FrequentSongs => SQL_FREQUENT_SONGS,
        }
    }

    /// The MPD search tag matching this ranking's entity kind.
    pub fn tag(self) -> Tag {
        match self {
            Ranking::RecentArtists | Ranking::FrequentArtists => Tag::Artist,
            Ranking::RecentAlbums | Ranking::FrequentAlbums => Tag::Album,
            Ranking::RecentSongs | Ranking::FrequentSongs => Tag::Title,
        }
    }

    /// Run this ranking against the store, returning names in rank order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Query`] if the statement fails.
    pub fn fetch(self, store: &Store) -> Result<Vec<String>> {
        let conn = store.connection();
        let mut stmt = conn.prepare(self.sql())?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(names)
    }
}
