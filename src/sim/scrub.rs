//! Pointer-to-history resolution
//!
//! Maps a pointer coordinate onto the recorded snapshot closest to it
//! along one axis. Ties go to the earliest snapshot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::KinematicState;

/// Axis a pointer scrubs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    #[inline]
    pub fn component(self, v: Vec2) -> f32 {
        match self {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        }
    }
}

/// Extent of a recorded trajectory along the scrub axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrubRange {
    pub min: f32,
    pub max: f32,
}

impl ScrubRange {
    pub fn of(entries: &[KinematicState], axis: Axis) -> Self {
        entries.iter().fold(
            Self {
                min: f32::INFINITY,
                max: f32::NEG_INFINITY,
            },
            |range, e| {
                let c = axis.component(e.pos);
                Self {
                    min: range.min.min(c),
                    max: range.max.max(c),
                }
            },
        )
    }

    /// Zero extent: the pointer cannot discriminate between entries
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

/// Index of the entry closest to `target` along `axis`.
///
/// A degenerate range always resolves to the last (settled) entry.
/// The caller clamps `target` to the canvas beforehand.
///
/// # Panics
/// If `entries` is empty.
pub fn resolve(entries: &[KinematicState], range: ScrubRange, target: f32, axis: Axis) -> usize {
    assert!(!entries.is_empty(), "scrub resolve on an empty history");

    if range.is_degenerate() {
        return entries.len() - 1;
    }

    let mut closest = 0;
    let mut min_diff = f32::INFINITY;
    for (i, entry) in entries.iter().enumerate() {
        let diff = (axis.component(entry.pos) - target).abs();
        // Strict comparison keeps the first of equidistant entries
        if diff < min_diff {
            min_diff = diff;
            closest = i;
        }
    }
    closest
}

/// `resolve` with the range computed on the spot
pub fn resolve_closest(entries: &[KinematicState], target: f32, axis: Axis) -> usize {
    resolve(entries, ScrubRange::of(entries, axis), target, axis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(x: f32, y: f32) -> KinematicState {
        KinematicState::new(Vec2::new(x, y), Vec2::ZERO)
    }

    #[test]
    fn test_resolve_nearest() {
        let entries = [at(0.0, 0.0), at(10.0, 0.0), at(20.0, 0.0), at(30.0, 0.0)];
        assert_eq!(resolve_closest(&entries, 12.0, Axis::Horizontal), 1);
        assert_eq!(resolve_closest(&entries, 26.0, Axis::Horizontal), 3);
        assert_eq!(resolve_closest(&entries, 1000.0, Axis::Horizontal), 3);
        assert_eq!(resolve_closest(&entries, -5.0, Axis::Horizontal), 0);
    }

    #[test]
    fn test_resolve_tie_prefers_lower_index() {
        let entries = [at(0.0, 0.0), at(10.0, 0.0), at(20.0, 0.0)];
        assert_eq!(resolve_closest(&entries, 15.0, Axis::Horizontal), 1);

        // Same x recorded twice (apex of a lob, settled entry)
        let entries = [at(5.0, 0.0), at(7.0, 0.0), at(7.0, 3.0)];
        assert_eq!(resolve_closest(&entries, 7.0, Axis::Horizontal), 1);
    }

    #[test]
    fn test_resolve_degenerate_returns_last() {
        let entries = [at(50.0, 0.0), at(50.0, 10.0), at(50.0, 20.0)];
        let range = ScrubRange::of(&entries, Axis::Horizontal);
        assert!(range.is_degenerate());
        for target in [0.0, 50.0, 800.0] {
            assert_eq!(resolve(&entries, range, target, Axis::Horizontal), 2);
        }
    }

    #[test]
    fn test_resolve_vertical_axis() {
        let entries = [at(50.0, 0.0), at(50.0, 10.0), at(50.0, 20.0)];
        assert_eq!(resolve_closest(&entries, 11.0, Axis::Vertical), 1);
    }

    #[test]
    #[should_panic(expected = "empty history")]
    fn test_resolve_empty_panics() {
        resolve_closest(&[], 0.0, Axis::Horizontal);
    }

    #[test]
    fn test_range() {
        let entries = [at(3.0, 0.0), at(-1.0, 0.0), at(7.5, 0.0)];
        let range = ScrubRange::of(&entries, Axis::Horizontal);
        assert_eq!(range, ScrubRange { min: -1.0, max: 7.5 });
        assert!(!range.is_degenerate());
    }

    proptest! {
        #[test]
        fn prop_resolve_is_idempotent_and_minimal(
            xs in proptest::collection::vec(-100.0f32..900.0, 1..64),
            target in 0.0f32..800.0,
        ) {
            let entries: Vec<_> = xs.iter().map(|&x| at(x, 0.0)).collect();
            let first = resolve_closest(&entries, target, Axis::Horizontal);
            let second = resolve_closest(&entries, target, Axis::Horizontal);
            prop_assert_eq!(first, second);

            if ScrubRange::of(&entries, Axis::Horizontal).is_degenerate() {
                prop_assert_eq!(first, entries.len() - 1);
                return Ok(());
            }

            let best = (xs[first] - target).abs();
            for (i, &x) in xs.iter().enumerate() {
                let d = (x - target).abs();
                prop_assert!(d >= best);
                if i < first {
                    prop_assert!(d > best);
                }
            }
        }
    }
}
