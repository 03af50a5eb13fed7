//! Rotation watches MPD for track changes, keeps a deduplicated play
//! history in SQLite, and rebuilds a fixed set of stored playlists ranked by
//! recency and frequency of listening.
//!
//! Core modules:
//! - [`detect`] - pure now-playing transition detector
//! - [`store`] - deduplicated entity tables + append-only play log
//! - [`ranking`] - recent/frequent aggregation queries
//! - [`playlist`] - playlist curation engine
//! - [`daemon`] - the watch loop and background-process management
//!
//! Supporting modules:
//! - [`mpd`] - MPD protocol client behind the [`mpd::Player`] seam
//! - [`config`] - runtime settings and data directory management
//! - [`cli`] - clap command definitions
//! - [`error`] - crate error taxonomy
//!
//! ## Control flow
//!
//! One poll cycle runs to completion before the next begins (500 ms default
//! interval): status poll -> transition detection -> `record_play` -> rebuild
//! of every configured playlist. A failed recording drops that one event; a
//! failed rebuild abandons only that playlist.
//!
//! Logging uses the `log` facade; set `RUST_LOG=debug` for per-cycle detail.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod detect;
pub mod error;
pub mod mpd;
pub mod playlist;
pub mod ranking;
pub mod store;
