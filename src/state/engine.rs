//! Draws songs for the current round, resolving previews and evicting tracks that have none.

use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::timeout};
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogClient, CatalogError, Track};

use super::{
    picker::{IndexPicker, PickRange},
    playlist::{DrawError, PlaylistCounts, Round, RoundPhase},
};

/// A song ready to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnSong {
    /// Track metadata.
    pub track: Track,
    /// Playable preview clip.
    pub preview_url: String,
    /// Counts after the draw.
    pub counts: PlaylistCounts,
}

/// Owner of the process-wide round. Seeds playlists and draws songs, evicting tracks
/// whose preview cannot be resolved.
pub struct PlaylistEngine {
    round: Mutex<Round>,
    client: Arc<dyn CatalogClient>,
    picker: Arc<dyn IndexPicker>,
    pick_range: PickRange,
    lookup_timeout: Duration,
}

impl PlaylistEngine {
    /// Build an engine with an empty round.
    pub fn new(
        client: Arc<dyn CatalogClient>,
        picker: Arc<dyn IndexPicker>,
        pick_range: PickRange,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            round: Mutex::new(Round::default()),
            client,
            picker,
            pick_range,
            lookup_timeout,
        }
    }

    /// Replace the current round with `catalog`.
    pub async fn seed(&self, catalog: Vec<Track>) -> PlaylistCounts {
        let mut round = self.round.lock().await;
        let counts = round.seed(catalog);
        info!(tracks = counts.playlist_length, "playlist seeded");
        counts
    }

    /// Current catalog size and songs left.
    pub async fn counts(&self) -> PlaylistCounts {
        self.round.lock().await.counts()
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> RoundPhase {
        self.round.lock().await.phase()
    }

    /// Run `f` against the round while holding its lock.
    pub async fn inspect<R>(&self, f: impl FnOnce(&Round) -> R) -> R {
        let round = self.round.lock().await;
        f(&round)
    }

    /// Draw the next playable song of the round.
    ///
    /// Every failed lookup removes one track from the catalog, so the loop ends after
    /// at most as many evictions as there were tracks when the draw started.
    pub async fn draw_next(&self) -> Result<DrawnSong, DrawError> {
        loop {
            let reservation = {
                let mut round = self.round.lock().await;
                round.reserve(self.picker.as_ref(), self.pick_range)?
            };
            let Track {
                ref artist_name,
                ref title,
            } = reservation.track;
            debug!(
                index = reservation.index,
                artist = %artist_name,
                %title,
                "resolving preview"
            );

            let lookup = timeout(
                self.lookup_timeout,
                self.client.fetch_preview_url(artist_name, title),
            )
            .await
            .unwrap_or(Err(CatalogError::Timeout(self.lookup_timeout)));

            let mut round = self.round.lock().await;
            match lookup {
                Ok(preview_url) => {
                    let counts = round.confirm(reservation.ticket)?;
                    debug!(%title, songs_left = counts.songs_left, "song drawn");
                    return Ok(DrawnSong {
                        track: reservation.track,
                        preview_url,
                        counts,
                    });
                }
                Err(err) => {
                    round.evict(reservation.ticket)?;
                    warn!(
                        error = %err,
                        artist = %artist_name,
                        %title,
                        remaining = round.catalog().len(),
                        "no preview for track; evicted from playlist"
                    );
                    if let Err(violation) = round.check_invariants() {
                        error!(%violation, "playlist bookkeeping corrupted after eviction");
                        return Err(violation.into());
                    }
                }
            }
        }
    }
}
