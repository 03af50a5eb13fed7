//! # Watch Loop & Daemon Management
//!
//! The watch loop polls MPD on a fixed interval and runs one full cycle to
//! completion before the next begins: poll status, detect a track change,
//! record the play, then rebuild every configured playlist. All I/O is
//! synchronous and the loop is the only writer of both connections, which is
//! what the store's lock-free get-or-create relies on.
//!
//! Failure policy per cycle: a failed `record_play` drops that one event and
//! skips the rebuilds; a failed playlist rebuild is contained inside
//! [`crate::playlist::rebuild_all`]. Only a lost MPD connection ends the
//! loop.
//!
//! The module also carries the PID-file plumbing for running the loop as a
//! background daemon (`rotation daemon start|stop|status`).

use crate::config::RuntimeConfig;
use crate::detect::TrackWatcher;
use crate::error::{Error, Result};
use crate::mpd::Player;
use crate::playlist::{self, PlaylistPlan};
use crate::store::Store;
use anyhow::{bail, Context};
use log::{debug, error, info};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Drives the poll-detect-record-rebuild cycle.
#[derive(Debug)]
pub struct Watcher {
    tracker: TrackWatcher,
    plans: Vec<PlaylistPlan>,
    interval: Duration,
}

impl Watcher {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            tracker: TrackWatcher::new(),
            plans: playlist::standard_plans(),
            interval: config.poll_interval,
        }
    }

    #[cfg(test)]
    fn with_plans(plans: Vec<PlaylistPlan>, interval: Duration) -> Self {
        Self {
            tracker: TrackWatcher::new(),
            plans,
            interval,
        }
    }

    /// Run one poll cycle: detect a transition and, if one happened, record
    /// the play and rebuild all playlists.
    ///
    /// A `record_play` failure is logged and the event dropped; the cycle
    /// still succeeds so the loop keeps going.
    ///
    /// # Errors
    ///
    /// Returns an error only when MPD itself cannot be queried.
    pub fn cycle<P: Player + ?Sized>(&mut self, player: &mut P, store: &Store) -> Result<()> {
        let status = player.status()?;
        if !self.tracker.observe(&status) {
            return Ok(());
        }

        let Some(track) = player.current_song()? else {
            debug!("transition without current song, skipping");
            return Ok(());
        };
        info!(
            "now playing {} by {} from {}",
            track.title, track.artist, track.album
        );

        if let Err(e) = store.record_play(&track) {
            error!("failed to record play, dropping event: {e}");
            return Ok(());
        }

        playlist::rebuild_all(player, store, &self.plans);
        Ok(())
    }

    /// Run cycles forever on the configured interval.
    ///
    /// # Errors
    ///
    /// Returns when the MPD connection is lost or a fatal error surfaces;
    /// transient command failures are logged and the loop continues.
    pub fn run<P: Player + ?Sized>(&mut self, player: &mut P, store: &Store) -> Result<()> {
        info!("watch loop started ({}ms interval)", self.interval.as_millis());
        loop {
            match self.cycle(player, store) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(Error::Playback(msg)) if msg.contains("closed the connection") => {
                    return Err(Error::Connection(msg));
                }
                Err(e) => error!("poll cycle failed: {e}"),
            }
            thread::sleep(self.interval);
        }
    }
}

fn pid_file() -> anyhow::Result<PathBuf> {
    Ok(crate::config::data_dir()?.join("rotation.pid"))
}

/// Record this process as the running daemon.
pub fn write_pid_file() -> anyhow::Result<()> {
    let pid = std::process::id();
    fs::write(pid_file()?, pid.to_string())?;
    info!("daemon started with PID {pid}");
    Ok(())
}

/// Remove the PID file on shutdown; missing file is fine.
pub fn remove_pid_file() {
    if let Ok(path) = pid_file() {
        let _ = fs::remove_file(path);
    }
}

/// Check whether a daemon process is currently running.
///
/// # Errors
///
/// Fails if the PID file exists but holds garbage.
pub fn is_running() -> anyhow::Result<bool> {
    let path = pid_file()?;
    if !path.exists() {
        return Ok(false);
    }

    let pid_str = fs::read_to_string(&path)?;
    let pid: u32 = pid_str.trim().parse().context("invalid PID in daemon file")?;

    // Signal 0 probes for existence without touching the process.
    match Command::new("kill").args(["-0", &pid.to_string()]).status() {
        Ok(status) => Ok(status.success()),
        Err(_) => Ok(false),
    }
}

/// Stop the running daemon via SIGTERM and clean up the PID file.
///
/// # Errors
///
/// Fails if no daemon is running or the signal cannot be sent.
pub fn stop() -> anyhow::Result<()> {
    let path = pid_file()?;
    if !path.exists() {
        bail!("daemon is not running");
    }

    let pid_str = fs::read_to_string(&path)?;
    let pid: u32 = pid_str.trim().parse().context("invalid PID in daemon file")?;

    Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()
        .context("failed to signal daemon")?;
    fs::remove_file(&path)?;

    info!("daemon stopped (PID: {pid})");
    Ok(())
}
