//! Bookkeeping of the current round: the candidate catalog and the indices already served.
//!
//! Indices into the catalog are the identity of a song for the whole round. When a
//! track is evicted the catalog is compacted and every stored index past the hole is
//! shifted down by one, so picked entries and pending reservations keep naming the same
//! songs.

use thiserror::Error;
use tracing::trace;

use crate::catalog::Track;

use super::picker::{IndexPicker, PickRange};

/// Rejected samples tolerated per catalog entry before falling back to a direct pick.
const REJECTED_SAMPLES_PER_TRACK: usize = 8;
const MIN_REJECTED_SAMPLES: usize = 32;

/// Lifecycle phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Nothing to draw from.
    Empty,
    /// At least one catalog entry has not been picked yet.
    Ready,
    /// Every catalog entry has been picked.
    Exhausted,
}

/// Playlist size and remaining songs, as shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistCounts {
    /// Number of tracks currently in the catalog.
    pub playlist_length: usize,
    /// Tracks not picked yet.
    pub songs_left: usize,
}

/// Identifies one pending reservation within one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    generation: u64,
    serial: u64,
}

/// A catalog index reserved for a draw whose preview lookup is still pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Handle used to confirm or evict the reservation.
    pub ticket: Ticket,
    /// Catalog index at reservation time.
    pub index: usize,
    /// The reserved track.
    pub track: Track,
}

/// Reasons a draw cannot produce a song.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    /// No playlist was ever generated.
    #[error("no playlist generated")]
    NoPlaylist,
    /// Every track of the playlist has already been served.
    #[error("every song of the playlist has been played")]
    Exhausted,
    /// Every remaining candidate was evicted for lack of a preview.
    #[error("no playable song left in the playlist")]
    NoSongAvailable,
    /// A new playlist was generated while the lookup was pending.
    #[error("playlist was replaced while the song was being resolved")]
    RoundReplaced,
    /// Bookkeeping went out of sync; this is a bug.
    #[error("playlist bookkeeping is inconsistent: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Broken round invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A picked index points past the end of the catalog.
    #[error("picked index {index} out of range for {len} tracks")]
    OutOfRange { index: usize, len: usize },
    /// The same index was picked twice.
    #[error("index {index} picked twice")]
    Duplicate { index: usize },
    /// A ticket was confirmed or evicted twice.
    #[error("reservation is no longer pending")]
    UnknownReservation,
}

/// State of the single active round.
#[derive(Debug, Default)]
pub struct Round {
    generation: u64,
    seeded: bool,
    catalog: Vec<Track>,
    picked: Vec<usize>,
    pending: Vec<(u64, usize)>,
    next_serial: u64,
}

impl Round {
    /// Start a new round with `catalog`, forgetting every pick and pending reservation.
    pub fn seed(&mut self, catalog: Vec<Track>) -> PlaylistCounts {
        self.generation += 1;
        self.seeded = true;
        self.catalog = catalog;
        self.picked.clear();
        self.pending.clear();
        self.counts()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RoundPhase {
        if self.catalog.is_empty() {
            RoundPhase::Empty
        } else if self.picked.len() >= self.catalog.len() {
            RoundPhase::Exhausted
        } else {
            RoundPhase::Ready
        }
    }

    /// Whether a playlist was ever seeded.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Catalog size and songs left.
    pub fn counts(&self) -> PlaylistCounts {
        PlaylistCounts {
            playlist_length: self.catalog.len(),
            songs_left: self.catalog.len().saturating_sub(self.picked.len()),
        }
    }

    /// Tracks of the current round, in catalog order.
    pub fn catalog(&self) -> &[Track] {
        &self.catalog
    }

    /// Picked indices, in pick order.
    pub fn picked(&self) -> &[usize] {
        &self.picked
    }

    /// Tracks behind the picked indices, in pick order.
    pub fn picked_tracks(&self) -> Vec<&Track> {
        self.picked
            .iter()
            .filter_map(|&index| self.catalog.get(index))
            .collect()
    }

    /// Reserve an unpicked index. The index joins the picked set immediately so no
    /// other draw can land on it while the caller resolves the preview.
    pub fn reserve(
        &mut self,
        picker: &dyn IndexPicker,
        range: PickRange,
    ) -> Result<Reservation, DrawError> {
        if !self.seeded {
            return Err(DrawError::NoPlaylist);
        }
        match self.phase() {
            RoundPhase::Empty => return Err(DrawError::NoSongAvailable),
            RoundPhase::Exhausted => return Err(DrawError::Exhausted),
            RoundPhase::Ready => {}
        }

        let index = self.sample_unpicked(picker, range);
        self.picked.push(index);

        let serial = self.next_serial;
        self.next_serial += 1;
        self.pending.push((serial, index));

        Ok(Reservation {
            ticket: Ticket {
                generation: self.generation,
                serial,
            },
            index,
            track: self.catalog[index].clone(),
        })
    }

    /// Keep a reservation whose preview was resolved.
    pub fn confirm(&mut self, ticket: Ticket) -> Result<PlaylistCounts, DrawError> {
        self.take_pending(ticket)?;
        Ok(self.counts())
    }

    /// Drop a reservation whose preview could not be resolved and remove its track
    /// from the catalog for good. Returns the evicted track.
    pub fn evict(&mut self, ticket: Ticket) -> Result<Track, DrawError> {
        let index = self.take_pending(ticket)?;

        // Sequential draws always hit the last entry; concurrent ones may not.
        let Some(position) = self.picked.iter().rposition(|&picked| picked == index) else {
            return Err(InvariantViolation::UnknownReservation.into());
        };
        self.picked.remove(position);

        let evicted = self.catalog.remove(index);

        for picked in self.picked.iter_mut() {
            if *picked > index {
                *picked -= 1;
            }
        }
        for (_, pending) in self.pending.iter_mut() {
            if *pending > index {
                *pending -= 1;
            }
        }

        Ok(evicted)
    }

    /// Verify that picked indices are unique and in range.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let len = self.catalog.len();
        let mut seen = vec![false; len];
        for &index in &self.picked {
            if index >= len {
                return Err(InvariantViolation::OutOfRange { index, len });
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(InvariantViolation::Duplicate { index });
            }
        }
        Ok(())
    }

    fn take_pending(&mut self, ticket: Ticket) -> Result<usize, DrawError> {
        if ticket.generation != self.generation {
            return Err(DrawError::RoundReplaced);
        }
        let Some(slot) = self
            .pending
            .iter()
            .position(|(serial, _)| *serial == ticket.serial)
        else {
            return Err(InvariantViolation::UnknownReservation.into());
        };
        Ok(self.pending.remove(slot).1)
    }

    /// Rejection-sample the picker; after too many misses pick directly among the
    /// unpicked indices so the draw never depends on luck to terminate.
    fn sample_unpicked(&self, picker: &dyn IndexPicker, range: PickRange) -> usize {
        let len = self.catalog.len();
        let high = range.upper_bound(len);
        let budget = (len * REJECTED_SAMPLES_PER_TRACK).max(MIN_REJECTED_SAMPLES);

        for _ in 0..budget {
            let candidate = picker.pick(0, high);
            if candidate < len && !self.picked.contains(&candidate) {
                return candidate;
            }
            trace!(candidate, len, "rejected sample");
        }

        let unpicked: Vec<usize> = (0..len).filter(|i| !self.picked.contains(i)).collect();
        let last = unpicked.len() - 1;
        unpicked[picker.pick(0, last).min(last)]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::state::{picker::RandomIndexPicker, testing::ScriptedPicker};

    fn catalog(titles: &str) -> Vec<Track> {
        titles
            .chars()
            .map(|c| Track::new("Artist", c.to_string()))
            .collect()
    }

    fn titles(round: &Round) -> String {
        round.catalog().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn unseeded_round_reports_no_playlist() {
        let mut round = Round::default();
        assert_eq!(round.phase(), RoundPhase::Empty);
        assert_eq!(
            round.reserve(&RandomIndexPicker, PickRange::Corrected),
            Err(DrawError::NoPlaylist)
        );
    }

    #[test]
    fn reservation_is_recorded_before_resolution() {
        let mut round = Round::default();
        round.seed(catalog("ABCDE"));
        let picker = ScriptedPicker::new([2]);

        let reservation = round.reserve(&picker, PickRange::Corrected).unwrap();
        assert_eq!(reservation.index, 2);
        assert_eq!(reservation.track.title, "C");
        assert_eq!(round.picked(), &[2]);
        assert_eq!(round.counts().songs_left, 4);
    }

    #[test]
    fn failing_track_is_evicted_and_picked_set_restored() {
        let mut round = Round::default();
        round.seed(catalog("ABCDEFGHIJ"));
        let picker = ScriptedPicker::new([3, 5]);

        let first = round.reserve(&picker, PickRange::Corrected).unwrap();
        assert_eq!(first.track.title, "D");
        let evicted = round.evict(first.ticket).unwrap();

        assert_eq!(evicted.title, "D");
        assert_eq!(titles(&round), "ABCEFGHIJ");
        assert!(round.picked().is_empty());

        let second = round.reserve(&picker, PickRange::Corrected).unwrap();
        assert_eq!(second.track.title, "G");
        round.confirm(second.ticket).unwrap();
        assert_eq!(
            round.counts(),
            PlaylistCounts {
                playlist_length: 9,
                songs_left: 8
            }
        );
    }

    #[test]
    fn eviction_shifts_later_picks_and_keeps_earlier_ones() {
        let mut round = Round::default();
        round.seed(catalog("ABCDEFGH"));
        // Serve B (1), G (6) and E (4), then fail on D (3).
        let picker = ScriptedPicker::new([1, 6, 4, 3]);

        for _ in 0..3 {
            let reservation = round.reserve(&picker, PickRange::Corrected).unwrap();
            round.confirm(reservation.ticket).unwrap();
        }
        let served_before: HashSet<Track> = round.picked_tracks().into_iter().cloned().collect();

        let failing = round.reserve(&picker, PickRange::Corrected).unwrap();
        round.evict(failing.ticket).unwrap();

        assert_eq!(round.picked(), &[1, 5, 3]);
        let served_after: HashSet<Track> = round.picked_tracks().into_iter().cloned().collect();
        assert_eq!(served_before, served_after);
        assert!(!round.catalog().contains(&Track::new("Artist", "D")));
        round.check_invariants().unwrap();
    }

    #[test]
    fn evicting_the_last_index_leaves_other_picks_untouched() {
        let mut round = Round::default();
        round.seed(catalog("ABC"));
        let picker = ScriptedPicker::new([0, 2]);

        let kept = round.reserve(&picker, PickRange::Corrected).unwrap();
        round.confirm(kept.ticket).unwrap();
        let failing = round.reserve(&picker, PickRange::Corrected).unwrap();
        round.evict(failing.ticket).unwrap();

        assert_eq!(titles(&round), "AB");
        assert_eq!(round.picked(), &[0]);
    }

    #[test]
    fn round_exhausts_after_every_track_is_served() {
        let mut round = Round::default();
        round.seed(catalog("XYZ"));
        let mut served = HashSet::new();

        for _ in 0..3 {
            let reservation = round
                .reserve(&RandomIndexPicker, PickRange::Corrected)
                .unwrap();
            assert!(served.insert(reservation.track.clone()), "track repeated");
            round.confirm(reservation.ticket).unwrap();
        }

        assert_eq!(round.phase(), RoundPhase::Exhausted);
        assert_eq!(round.counts().songs_left, 0);
        assert_eq!(
            round.reserve(&RandomIndexPicker, PickRange::Corrected),
            Err(DrawError::Exhausted)
        );
    }

    #[test]
    fn evicting_everything_empties_the_round() {
        let mut round = Round::default();
        round.seed(catalog("ABCD"));

        for remaining in (0..4).rev() {
            let reservation = round
                .reserve(&RandomIndexPicker, PickRange::Corrected)
                .unwrap();
            round.evict(reservation.ticket).unwrap();
            assert_eq!(round.catalog().len(), remaining);
            round.check_invariants().unwrap();
        }

        assert_eq!(round.phase(), RoundPhase::Empty);
        assert_eq!(
            round.reserve(&RandomIndexPicker, PickRange::Corrected),
            Err(DrawError::NoSongAvailable)
        );
    }

    #[test]
    fn legacy_range_rejects_one_past_the_end() {
        let mut round = Round::default();
        round.seed(catalog("ABCD"));
        let picker = ScriptedPicker::new([4, 4, 1]);

        let reservation = round.reserve(&picker, PickRange::Legacy).unwrap();

        assert_eq!(reservation.index, 1);
        assert_eq!(round.picked(), &[1]);
        assert!(picker.calls().iter().all(|&(low, high)| low == 0 && high == 4));
    }

    #[test]
    fn corrected_range_never_asks_past_the_end() {
        let mut round = Round::default();
        round.seed(catalog("ABCD"));
        let picker = ScriptedPicker::new([3]);

        round.reserve(&picker, PickRange::Corrected).unwrap();

        assert_eq!(picker.calls(), vec![(0, 3)]);
    }

    #[test]
    fn already_picked_samples_are_redrawn() {
        let mut round = Round::default();
        round.seed(catalog("ABCD"));
        let picker = ScriptedPicker::new([2, 2, 2, 0]);

        let first = round.reserve(&picker, PickRange::Corrected).unwrap();
        round.confirm(first.ticket).unwrap();
        let second = round.reserve(&picker, PickRange::Corrected).unwrap();

        assert_eq!(second.index, 0);
        assert_eq!(round.picked(), &[2, 0]);
    }

    #[test]
    fn stuck_picker_falls_back_to_an_unpicked_index() {
        let mut round = Round::default();
        round.seed(catalog("AB"));
        // The picker keeps answering 0; the second draw has to land on 1 anyway.
        let picker = ScriptedPicker::repeating(0);

        let first = round.reserve(&picker, PickRange::Corrected).unwrap();
        round.confirm(first.ticket).unwrap();
        let second = round.reserve(&picker, PickRange::Corrected).unwrap();

        assert_eq!((first.index, second.index), (0, 1));
    }

    #[test]
    fn concurrent_reservations_are_renumbered_on_eviction() {
        let mut round = Round::default();
        round.seed(catalog("ABCDEF"));
        let picker = ScriptedPicker::new([1, 4]);

        let failing = round.reserve(&picker, PickRange::Corrected).unwrap();
        let other = round.reserve(&picker, PickRange::Corrected).unwrap();
        assert_ne!(failing.index, other.index);

        round.evict(failing.ticket).unwrap();
        assert_eq!(round.picked(), &[3]);

        // The second reservation still refers to E and evicts it, not F.
        let evicted = round.evict(other.ticket).unwrap();
        assert_eq!(evicted.title, "E");
        assert_eq!(titles(&round), "ACDF");
        assert!(round.picked().is_empty());
    }

    #[test]
    fn reseeding_invalidates_pending_tickets() {
        let mut round = Round::default();
        round.seed(catalog("ABC"));
        let stale = round
            .reserve(&RandomIndexPicker, PickRange::Corrected)
            .unwrap();

        round.seed(catalog("DEF"));

        assert_eq!(round.evict(stale.ticket), Err(DrawError::RoundReplaced));
        assert_eq!(round.confirm(stale.ticket), Err(DrawError::RoundReplaced));
        assert_eq!(titles(&round), "DEF");
        assert!(round.picked().is_empty());
    }

    #[test]
    fn ticket_cannot_be_settled_twice() {
        let mut round = Round::default();
        round.seed(catalog("AB"));
        let reservation = round
            .reserve(&RandomIndexPicker, PickRange::Corrected)
            .unwrap();

        round.confirm(reservation.ticket).unwrap();
        assert_eq!(
            round.evict(reservation.ticket),
            Err(DrawError::Invariant(InvariantViolation::UnknownReservation))
        );
    }

    #[test]
    fn random_failures_never_break_invariants() {
        for seed_len in [1usize, 2, 5, 12, 30] {
            let mut round = Round::default();
            round.seed(
                (0..seed_len)
                    .map(|i| Track::new("Artist", format!("song-{i}")))
                    .collect(),
            );
            let mut served: Vec<Track> = Vec::new();

            while round.phase() == RoundPhase::Ready {
                let reservation = round
                    .reserve(&RandomIndexPicker, PickRange::Legacy)
                    .unwrap();
                // Fail every third title deterministically.
                if reservation.track.title.len() % 3 == 0 {
                    let evicted = round.evict(reservation.ticket).unwrap();
                    assert!(!served.contains(&evicted));
                } else {
                    round.confirm(reservation.ticket).unwrap();
                    assert!(!served.contains(&reservation.track), "track repeated");
                    served.push(reservation.track);
                }

                round.check_invariants().unwrap();
                let derived: HashSet<&Track> = round.picked_tracks().into_iter().collect();
                assert_eq!(derived, served.iter().collect::<HashSet<_>>());
            }
        }
    }
}
