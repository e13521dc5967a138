//! Random index selection used to draw songs from the current catalog.

use rand::Rng;
use serde::Deserialize;

/// Source of random integers in an inclusive range.
pub trait IndexPicker: Send + Sync {
    /// Return an integer uniformly distributed in `[low, high]`.
    fn pick(&self, low: usize, high: usize) -> usize;
}

/// [`IndexPicker`] backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIndexPicker;

impl IndexPicker for RandomIndexPicker {
    fn pick(&self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        rand::rng().random_range(low..=high)
    }
}

/// Upper bound handed to the picker when sampling a catalog of `len` tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickRange {
    /// Sample `[0, len - 1]`: every sample is a valid index.
    #[default]
    Corrected,
    /// Sample `[0, len]`: `len` itself can come out and has to be rejected.
    Legacy,
}

impl PickRange {
    /// Inclusive upper bound for a non-empty catalog of `len` tracks.
    pub fn upper_bound(self, len: usize) -> usize {
        match self {
            PickRange::Corrected => len.saturating_sub(1),
            PickRange::Legacy => len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_picker_stays_within_inclusive_bounds() {
        let picker = RandomIndexPicker;
        let mut seen_low = false;
        let mut seen_high = false;

        for _ in 0..2_000 {
            let value = picker.pick(3, 6);
            assert!((3..=6).contains(&value));
            seen_low |= value == 3;
            seen_high |= value == 6;
        }

        assert!(seen_low && seen_high, "both bounds should be reachable");
    }

    #[test]
    fn degenerate_range_returns_low() {
        assert_eq!(RandomIndexPicker.pick(4, 4), 4);
        assert_eq!(RandomIndexPicker.pick(4, 2), 4);
    }

    #[test]
    fn legacy_range_includes_one_past_the_end() {
        assert_eq!(PickRange::Legacy.upper_bound(10), 10);
        assert_eq!(PickRange::Corrected.upper_bound(10), 9);
        assert_eq!(PickRange::Corrected.upper_bound(0), 0);
    }
}
