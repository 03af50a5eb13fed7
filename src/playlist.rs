//! # Playlist Curation Engine
//!
//! Rebuilds stored MPD playlists from ranking queries. Each configured plan
//! maps one [`Ranking`] to a named playlist; on every detected track change
//! all plans are re-run in order.
//!
//! A rebuild stages every matching URI in memory first and only then appends
//! them to the playlist one at a time, with a short pacing delay before each
//! append. MPD silently drops stored-playlist appends that arrive
//! back-to-back, so the delay is a correctness requirement rather than
//! politeness.
//!
//! Failure isolation: any search or append failure abandons the current
//! plan (the playlist stays cleared but incomplete) and the remaining plans
//! still run.

use crate::error::Result;
use crate::mpd::Player;
use crate::ranking::Ranking;
use crate::store::Store;
use log::{debug, error, info};
use std::thread;
use std::time::Duration;

/// Pause before each stored-playlist append.
const APPEND_DELAY: Duration = Duration::from_millis(10);

/// One configured playlist rebuild.
#[derive(Debug, Clone)]
pub struct PlaylistPlan {
    pub ranking: Ranking,
    /// Name of the stored playlist to rebuild.
    pub name: &'static str,
    /// Use only the single highest-ranked name instead of the full ranking.
    pub top_only: bool,
}

/// The fixed, ordered set of playlists maintained by the watch loop.
pub fn standard_plans() -> Vec<PlaylistPlan> {
    vec![
        PlaylistPlan {
            ranking: Ranking::FrequentAlbums,
            name: "Most Played Albums",
            top_only: false,
        },
        PlaylistPlan {
            ranking: Ranking::FrequentArtists,
            name: "Most Played Artists",
            top_only: false,
        },
        PlaylistPlan {
            ranking: Ranking::RecentAlbums,
            name: "Recently Played Albums",
            top_only: false,
        },
        PlaylistPlan {
            ranking: Ranking::RecentArtists,
            name: "From Recently Played Artists",
            top_only: false,
        },
        PlaylistPlan {
            ranking: Ranking::RecentAlbums,
            name: "Last Played Album",
            top_only: true,
        },
        PlaylistPlan {
            ranking: Ranking::RecentArtists,
            name: "From Last Played Artists",
            top_only: true,
        },
    ]
}

/// Rebuild one playlist from its ranking.
///
/// Steps: fetch the ranking (truncated to one name for `top_only`; an empty
/// ranking is a no-op), clear the target playlist, stage the URIs of every
/// search hit in ranking order, then append them one at a time.
///
/// # Errors
///
/// Returns the first ranking, search or append error; the playlist is left
/// cleared but incomplete in that case.
pub fn rebuild<P: Player + ?Sized>(
    player: &mut P,
    store: &Store,
    plan: &PlaylistPlan,
) -> Result<()> {
    let mut names = plan.ranking.fetch(store)?;
    if plan.top_only {
        names.truncate(1);
    }
    debug!("{}: {} ranked names", plan.name, names.len());
    if names.is_empty() {
        return Ok(());
    }

    player.playlist_clear(plan.name)?;

    // Stage everything before touching the playlist, so a failed search
    // never leaves a half-ordered result.
    let mut staged: Vec<String> = Vec::new();
    for name in &names {
        let uris = player.search(plan.ranking.tag(), name)?;
        debug!("{}: '{}' matched {} uris", plan.name, name, uris.len());
        staged.extend(uris);
    }

    for uri in &staged {
        thread::sleep(APPEND_DELAY);
        player.playlist_add(plan.name, uri)?;
    }

    info!("rebuilt playlist '{}' with {} tracks", plan.name, staged.len());
    Ok(())
}

/// Run every plan in order. A failed plan is logged and skipped; it never
/// blocks the plans after it.
pub fn rebuild_all<P: Player + ?Sized>(player: &mut P, store: &Store, plans: &[PlaylistPlan]) {
    for plan in plans {
        if let Err(e) = rebuild(player, store, plan) {
            error!("rebuild of '{}' failed: {e}", plan.name);
        }
    }
}
