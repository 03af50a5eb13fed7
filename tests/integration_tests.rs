//! # Integration Tests for Rotation
//!
//! End-to-end flows over a real (temporary or in-memory) history database
//! and a scripted stand-in for MPD: detector-driven poll cycles, the
//! record-then-rebuild pipeline, and failure isolation between playlists.

use anyhow::Result;
use rotation::daemon::Watcher;
use rotation::error::Error;
use rotation::mpd::{PlayState, Player, Status, Tag};
use rotation::playlist::{self, PlaylistPlan};
use rotation::ranking::Ranking;
use rotation::store::{Store, Track};
use std::collections::HashMap;
use tempfile::TempDir;

/// Scripted playback service: a queue of status reports, a music library
/// served through search, and recorded stored-playlist mutations.
#[derive(Default)]
struct StubMpd {
    /// Pending status reports, oldest first.
    statuses: Vec<Status>,
    /// Song id the last status reported, feeds current_song.
    active_id: Option<u32>,
    queue: HashMap<u32, Track>,
    library: HashMap<(Tag, String), Vec<String>>,
    fail_search: Vec<String>,
    playlists: HashMap<String, Vec<String>>,
    cleared: Vec<String>,
    searched: Vec<String>,
}

impl StubMpd {
    fn push_status(&mut self, state: PlayState, song_id: Option<u32>) {
        self.statuses.push(Status { state, song_id });
    }

    fn add_track(&mut self, track: Track, uri: &str) {
        self.library
            .entry((Tag::Artist, track.artist.clone()))
            .or_default()
            .push(uri.to_string());
        self.library
            .entry((Tag::Album, track.album.clone()))
            .or_default()
            .push(uri.to_string());
        self.library
            .entry((Tag::Title, track.title.clone()))
            .or_default()
            .push(uri.to_string());
        self.queue.insert(track.mpd_id, track);
    }
}

impl Player for StubMpd {
    fn status(&mut self) -> rotation::error::Result<Status> {
        let status = if self.statuses.is_empty() {
            Status {
                state: PlayState::Stop,
                song_id: None,
            }
        } else {
            self.statuses.remove(0)
        };
        self.active_id = status.song_id;
        Ok(status)
    }

    fn current_song(&mut self) -> rotation::error::Result<Option<Track>> {
        Ok(self
            .active_id
            .and_then(|id| self.queue.get(&id).cloned()))
    }

    fn playlist_clear(&mut self, name: &str) -> rotation::error::Result<()> {
        self.cleared.push(name.to_string());
        self.playlists.remove(name);
        Ok(())
    }

    fn search(&mut self, tag: Tag, value: &str) -> rotation::error::Result<Vec<String>> {
        self.searched.push(value.to_string());
        if self.fail_search.iter().any(|v| v == value) {
            return Err(Error::Playback(format!("ACK search failed: {value}")));
        }
        Ok(self
            .library
            .get(&(tag, value.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn playlist_add(&mut self, name: &str, uri: &str) -> rotation::error::Result<()> {
        self.playlists
            .entry(name.to_string())
            .or_default()
            .push(uri.to_string());
        Ok(())
    }
}

fn track(title: &str, artist: &str, album: &str, mpd_id: u32) -> Track {
    Track {
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        mpd_id,
    }
}

fn play_count(store: &Store) -> i64 {
    store
        .connection()
        .query_row("SELECT COUNT(*) FROM plays", [], |row| row.get(0))
        .unwrap()
}

/// Pin the timestamp of the most recent play row.
fn pin_last_play(store: &Store, time: &str) {
    store
        .connection()
        .execute(
            "UPDATE plays SET time = ?1 WHERE rowid = (SELECT MAX(rowid) FROM plays)",
            [time],
        )
        .unwrap();
}

mod store_lifecycle {
    use super::*;

    #[test]
    fn history_survives_process_restart() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("history.db");

        {
            let store = Store::open(&path)?;
            store.record_play(&track("Song", "Artist", "Album", 1))?;
            store.record_play(&track("Song", "Artist", "Album", 1))?;
        }

        let store = Store::open(&path)?;
        assert_eq!(play_count(&store), 2);
        assert_eq!(Ranking::FrequentSongs.fetch(&store)?, vec!["Song"]);
        Ok(())
    }

    #[test]
    fn frequent_songs_ranks_by_count_across_restarts() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("history.db");

        {
            let store = Store::open(&path)?;
            for _ in 0..3 {
                store.record_play(&track("Song A", "Artist", "Album", 1))?;
            }
            store.record_play(&track("Song B", "Artist", "Album", 2))?;
        }

        let store = Store::open(&path)?;
        assert_eq!(
            Ranking::FrequentSongs.fetch(&store)?,
            vec!["Song A", "Song B"]
        );
        Ok(())
    }
}

mod watch_pipeline {
    use super::*;
    use std::time::Duration;

    fn watcher() -> Watcher {
        let config = rotation::config::RuntimeConfig {
            poll_interval: Duration::from_millis(1),
            ..Default::default()
        };
        Watcher::new(&config)
    }

    #[test]
    fn detected_play_rebuilds_the_standard_playlists() -> Result<()> {
        let store = Store::open_in_memory()?;
        let mut mpd = StubMpd::default();
        mpd.add_track(
            track("Sinnerman", "Nina Simone", "Pastel Blues", 17),
            "nina/pastel-blues/sinnerman.flac",
        );
        mpd.push_status(PlayState::Play, Some(17));

        let mut watcher = watcher();
        watcher.cycle(&mut mpd, &store)?;

        assert_eq!(play_count(&store), 1);
        // All six standard playlists were rebuilt from the one play.
        for plan in playlist::standard_plans() {
            assert!(
                mpd.cleared.contains(&plan.name.to_string()),
                "{} was not cleared",
                plan.name
            );
            assert_eq!(
                mpd.playlists.get(plan.name),
                Some(&vec!["nina/pastel-blues/sinnerman.flac".to_string()]),
                "{} has wrong contents",
                plan.name
            );
        }
        Ok(())
    }

    #[test]
    fn unchanged_song_triggers_no_rebuilds() -> Result<()> {
        let store = Store::open_in_memory()?;
        let mut mpd = StubMpd::default();
        mpd.add_track(track("Song", "Artist", "Album", 5), "a/song.flac");
        mpd.push_status(PlayState::Play, Some(5));
        mpd.push_status(PlayState::Play, Some(5));

        let mut watcher = watcher();
        watcher.cycle(&mut mpd, &store)?;
        let rebuilds_after_first = mpd.cleared.len();
        watcher.cycle(&mut mpd, &store)?;

        assert_eq!(mpd.cleared.len(), rebuilds_after_first);
        assert_eq!(play_count(&store), 1);
        Ok(())
    }

    #[test]
    fn stop_and_resume_of_same_song_records_one_play() -> Result<()> {
        let store = Store::open_in_memory()?;
        let mut mpd = StubMpd::default();
        mpd.add_track(track("Song", "Artist", "Album", 5), "a/song.flac");
        mpd.push_status(PlayState::Play, Some(5));
        mpd.push_status(PlayState::Stop, None);
        mpd.push_status(PlayState::Play, Some(5));

        let mut watcher = watcher();
        for _ in 0..3 {
            watcher.cycle(&mut mpd, &store)?;
        }

        assert_eq!(play_count(&store), 1);
        Ok(())
    }

    #[test]
    fn one_broken_playlist_does_not_block_the_rest() -> Result<()> {
        let store = Store::open_in_memory()?;
        store.record_play(&track("Song", "Artist", "Album", 1))?;

        let mut mpd = StubMpd::default();
        mpd.add_track(track("Song", "Artist", "Album", 1), "a/song.flac");
        // Every artist search fails; album searches still work.
        mpd.fail_search.push("Artist".to_string());

        playlist::rebuild_all(&mut mpd, &store, &playlist::standard_plans());

        assert!(mpd.playlists.get("Most Played Artists").is_none());
        assert!(mpd.playlists.get("From Recently Played Artists").is_none());
        assert_eq!(
            mpd.playlists.get("Most Played Albums"),
            Some(&vec!["a/song.flac".to_string()])
        );
        assert_eq!(
            mpd.playlists.get("Recently Played Albums"),
            Some(&vec!["a/song.flac".to_string()])
        );
        Ok(())
    }
}

mod curation {
    use super::*;

    #[test]
    fn top_only_playlist_holds_only_the_latest_album() -> Result<()> {
        let store = Store::open_in_memory()?;
        store.record_play(&track("First", "Artist A", "Album A", 1))?;
        pin_last_play(&store, "2026-08-01 10:00:00");
        store.record_play(&track("Second", "Artist B", "Album B", 2))?;
        pin_last_play(&store, "2026-08-02 10:00:00");

        let mut mpd = StubMpd::default();
        mpd.add_track(track("First", "Artist A", "Album A", 1), "a/first.flac");
        mpd.add_track(track("Second", "Artist B", "Album B", 2), "b/second.flac");

        let plan = PlaylistPlan {
            ranking: Ranking::RecentAlbums,
            name: "Last Played Album",
            top_only: true,
        };
        playlist::rebuild(&mut mpd, &store, &plan)?;

        // Only the highest-ranked name was ever searched.
        assert_eq!(mpd.searched, vec!["Album B"]);
        assert_eq!(
            mpd.playlists.get("Last Played Album"),
            Some(&vec!["b/second.flac".to_string()])
        );
        Ok(())
    }

    #[test]
    fn full_ranking_playlist_concatenates_matches_in_rank_order() -> Result<()> {
        let store = Store::open_in_memory()?;
        // Album B twice, Album A once.
        store.record_play(&track("Second", "Artist B", "Album B", 2))?;
        store.record_play(&track("Second", "Artist B", "Album B", 2))?;
        store.record_play(&track("First", "Artist A", "Album A", 1))?;

        let mut mpd = StubMpd::default();
        mpd.add_track(track("First", "Artist A", "Album A", 1), "a/first.flac");
        mpd.add_track(track("Second", "Artist B", "Album B", 2), "b/second.flac");

        let plan = PlaylistPlan {
            ranking: Ranking::FrequentAlbums,
            name: "Most Played Albums",
            top_only: false,
        };
        playlist::rebuild(&mut mpd, &store, &plan)?;

        assert_eq!(mpd.searched, vec!["Album B", "Album A"]);
        assert_eq!(
            mpd.playlists.get("Most Played Albums"),
            Some(&vec!["b/second.flac".to_string(), "a/first.flac".to_string()])
        );
        Ok(())
    }
}
