//! # Now-Playing Detector
//!
//! Pure transition detector over MPD status reports. Kept free of I/O so the
//! state machine can be tested without a running MPD; the watch loop feeds it
//! one [`Status`] per poll cycle.
//!
//! Three effective states: idle (no song seen yet), track known, and a
//! one-cycle "just changed" pulse reported through the return value of
//! [`TrackWatcher::observe`]. The pulse is never sticky - the next poll of
//! the same song returns `false` again.

use crate::mpd::Status;

/// Remembers the last observed MPD song id between poll cycles.
#[derive(Debug, Default)]
pub struct TrackWatcher {
    current_id: Option<u32>,
}

impl TrackWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one status report; returns `true` exactly when the active song
    /// id differs from the last one seen.
    ///
    /// A stopped player (no song id) never pulses and leaves the remembered
    /// id in place, so stopping and resuming the same queue entry is not
    /// re-counted as a play.
    pub fn observe(&mut self, status: &Status) -> bool {
        match status.song_id {
            None => false,
            Some(id) if Some(id) != self.current_id => {
                self.current_id = Some(id);
                true
            }
            Some(_) => false,
        }
    }
}
