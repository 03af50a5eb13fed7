//! # MPD Client Module
//!
//! Minimal client for the MPD text protocol, covering exactly the capability
//! set the watch loop consumes: status polling, current-song metadata, and
//! the stored-playlist commands (`playlistclear`, `search`, `playlistadd`).
//!
//! The [`Player`] trait is the seam between the curation engine and the
//! playback service; tests substitute a scripted fake, production uses
//! [`MpdClient`] over a blocking TCP session. There are no per-command
//! timeouts - a hung server stalls the whole poll cycle.
//!
//! Responses are line-oriented `key: value` pairs terminated by `OK`, or an
//! `ACK ...` line on failure. Parsing is factored into pure helpers so it
//! can be tested without a socket.

use crate::error::{Error, Result};
use crate::store::Track;
use log::debug;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

/// MPD tag a search is constrained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Artist,
    Album,
    Title,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Artist => "artist",
            Tag::Album => "album",
            Tag::Title => "title",
        }
    }
}

/// Player state reported by `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Play,
    Pause,
    Stop,
}

/// Subset of the `status` response the detector needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub state: PlayState,
    /// Active queue entry id; `None` when playback is stopped.
    pub song_id: Option<u32>,
}

/// The playback-service capability set consumed by the watch loop and the
/// curation engine.
pub trait Player {
    /// Current player state and active song id.
    fn status(&mut self) -> Result<Status>;

    /// Metadata of the currently playing track, `None` if nothing plays.
    fn current_song(&mut self) -> Result<Option<Track>>;

    /// Empty the named stored playlist. A playlist that does not exist yet
    /// counts as success.
    fn playlist_clear(&mut self, name: &str) -> Result<()>;

    /// Search the music database for songs whose `tag` matches `value`,
    /// returning their URIs in server order.
    fn search(&mut self, tag: Tag, value: &str) -> Result<Vec<String>>;

    /// Append one URI to the named stored playlist.
    fn playlist_add(&mut self, name: &str, uri: &str) -> Result<()>;
}

/// Blocking MPD protocol session.
#[derive(Debug)]
pub struct MpdClient {
    reader: BufReader<TcpStream>,
}

impl MpdClient {
    /// Connect to MPD and consume the protocol greeting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the TCP connect fails or the server
    /// does not present an MPD greeting; fatal at startup.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port))
            .map_err(|e| Error::Connection(format!("cannot reach mpd at {host}:{port}: {e}")))?;
        let mut reader = BufReader::new(stream);

        let mut greeting = String::new();
        reader
            .read_line(&mut greeting)
            .map_err(|e| Error::Connection(format!("mpd greeting read failed: {e}")))?;
        if !greeting.starts_with("OK MPD") {
            return Err(Error::Connection(format!(
                "unexpected mpd greeting: {}",
                greeting.trim_end()
            )));
        }
        debug!("connected to mpd: {}", greeting.trim_end());

        Ok(Self { reader })
    }

    /// Send one command and collect the `key: value` response pairs.
    fn command(&mut self, cmd: &str) -> Result<Vec<(String, String)>> {
        debug!("mpd <- {cmd}");
        let stream = self.reader.get_mut();
        stream.write_all(cmd.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;

        let mut pairs = Vec::new();
        loop {
            let mut line = String::new();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                return Err(Error::Playback("mpd closed the connection".to_string()));
            }
            let line = line.trim_end();

            if line == "OK" {
                return Ok(pairs);
            }
            if line.starts_with("ACK") {
                return Err(Error::Playback(line.to_string()));
            }
            if let Some((key, value)) = parse_pair(line) {
                pairs.push((key.to_string(), value.to_string()));
            }
        }
    }
}

impl Player for MpdClient {
    fn status(&mut self) -> Result<Status> {
        let pairs = self.command("status")?;
        Ok(status_from_pairs(&pairs))
    }

    fn current_song(&mut self) -> Result<Option<Track>> {
        let pairs = self.command("currentsong")?;
        Ok(track_from_pairs(&pairs))
    }

    fn playlist_clear(&mut self, name: &str) -> Result<()> {
        match self.command(&format!("playlistclear {}", quote(name))) {
            Ok(_) => Ok(()),
            // Clearing a playlist that was never saved is fine.
            Err(Error::Playback(msg)) if msg.contains("No such playlist") => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn search(&mut self, tag: Tag, value: &str) -> Result<Vec<String>> {
        let pairs = self.command(&format!("search {} {}", tag.as_str(), quote(value)))?;
        Ok(uris_from_pairs(&pairs))
    }

    fn playlist_add(&mut self, name: &str, uri: &str) -> Result<()> {
        self.command(&format!("playlistadd {} {}", quote(name), quote(uri)))?;
        Ok(())
    }
}

/// Split one response line into its key and value.
fn parse_pair(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
}

/// Quote a command argument, escaping backslashes and double quotes.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn status_from_pairs(pairs: &[(String, String)]) -> Status {
    let mut state = PlayState::Stop;
    let mut song_id = None;

    for (key, value) in pairs {
        match key.as_str() {
            "state" => {
                state = match value.as_str() {
                    "play" => PlayState::Play,
                    "pause" => PlayState::Pause,
                    _ => PlayState::Stop,
                }
            }
            "songid" => song_id = value.parse().ok(),
            _ => {}
        }
    }

    Status { state, song_id }
}

fn track_from_pairs(pairs: &[(String, String)]) -> Option<Track> {
    let mut title = None;
    let mut artist = None;
    let mut album = None;
    let mut id = None;

    for (key, value) in pairs {
        match key.as_str() {
            "Title" => title = Some(value.clone()),
            "Artist" => artist = Some(value.clone()),
            "Album" => album = Some(value.clone()),
            "Id" => id = value.parse().ok(),
            _ => {}
        }
    }

    Some(Track {
        mpd_id: id?,
        title: title.unwrap_or_default(),
        artist: artist.unwrap_or_default(),
        album: album.unwrap_or_default(),
    })
}

fn uris_from_pairs(pairs: &[(String, String)]) -> Vec<String> {
    pairs
        .iter()
        .filter(|(key, _)| key == "file")
        .map(|(_, value)| value.clone())
        .collect()
}
