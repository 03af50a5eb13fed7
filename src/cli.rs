//! # Command-Line Interface Module
//!
//! Clap definitions for the `rotation` binary. There is no interactive
//! surface - the commands manage the watch-loop process and offer one
//! read-only view of the rankings.
//!
//! ## Commands
//!
//! - `run`: watch MPD in the foreground until terminated
//! - `daemon start|stop|status`: manage a background watch loop
//! - `charts`: print one ranking from the play history

use crate::ranking::Ranking;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main application arguments.
#[derive(Parser)]
#[command(name = "rotation")]
#[command(about = "Rotation: MPD play history tracking & auto-curated playlists")]
#[command(version)]
pub struct Args {
    /// MPD host to connect to
    #[arg(long, env = "MPD_HOST", default_value = "localhost", global = true)]
    pub host: String,

    /// MPD port to connect to
    #[arg(long, env = "MPD_PORT", default_value_t = 6600, global = true)]
    pub port: u16,

    /// Path to the play history database (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Milliseconds between poll cycles
    #[arg(long, default_value_t = crate::config::DEFAULT_POLL_INTERVAL_MS, global = true)]
    pub interval_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Watch MPD in the foreground, recording plays and rebuilding playlists
    ///
    /// Polls MPD on the configured interval; every detected track change is
    /// recorded in the history database and all curated playlists are
    /// rebuilt. Runs until terminated.
    Run,

    /// Print one ranking from the play history
    Charts {
        /// Which ranking to print
        #[arg(value_enum)]
        chart: Chart,
    },

    /// Manage the background watch daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
}

#[derive(Subcommand)]
pub enum DaemonAction {
    /// Fork a watch loop into the background
    Start,
    /// Terminate the running daemon
    Stop,
    /// Report whether the daemon is running
    Status,
}

/// CLI names for the ranking queries.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Chart {
    RecentArtists,
    RecentAlbums,
    RecentSongs,
    FrequentArtists,
    FrequentAlbums,
    FrequentSongs,
}

impl Chart {
    pub fn ranking(self) -> Ranking {
        match self {
            Chart::RecentArtists => Ranking::RecentArtists,
            Chart::RecentAlbums => Ranking::RecentAlbums,
            Chart::RecentSongs => Ranking::RecentSongs,
            Chart::FrequentArtists => Ranking::FrequentArtists,
            Chart::FrequentAlbums => Ranking::FrequentAlbums,
            Chart::FrequentSongs => Ranking::FrequentSongs,
        }
    }
}
