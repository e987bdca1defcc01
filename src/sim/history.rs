//! Append-only motion history
//!
//! Entries are stored in chronological order. Timestamps never decrease,
//! which lets the rolling-window trim use a binary search.

use serde::{Deserialize, Serialize};

use super::state::KinematicState;

/// Anything recorded into a history carries a timestamp
pub trait Timestamped {
    fn timestamp(&self) -> f32;
}

impl Timestamped for KinematicState {
    #[inline]
    fn timestamp(&self) -> f32 {
        self.elapsed
    }
}

/// Chronological buffer of snapshots owned by one simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryBuffer<T = KinematicState> {
    entries: Vec<T>,
}

impl<T> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Timestamped> HistoryBuffer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a snapshot
    pub fn record(&mut self, entry: T) {
        debug_assert!(
            self.entries
                .last()
                .is_none_or(|last| last.timestamp() <= entry.timestamp()),
            "history timestamps must not decrease"
        );
        self.entries.push(entry);
    }

    /// Drop every entry (capacity is kept for the next run)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries older than `min_time`
    pub fn trim_before(&mut self, min_time: f32) {
        let keep_from = self
            .entries
            .partition_point(|e| e.timestamp() < min_time);
        if keep_from > 0 {
            self.entries.drain(..keep_from);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn at(t: f32) -> KinematicState {
        KinematicState {
            pos: Vec2::new(t, 0.0),
            vel: Vec2::ZERO,
            elapsed: t,
        }
    }

    #[test]
    fn test_record_keeps_order() {
        let mut h = HistoryBuffer::new();
        for t in 0..5 {
            h.record(at(t as f32));
        }
        // Settled entry shares the last timestamp
        h.record(at(4.0));
        assert_eq!(h.len(), 6);
        assert_eq!(h.first().map(|e| e.elapsed), Some(0.0));
        assert_eq!(h.last().map(|e| e.elapsed), Some(4.0));
        assert!(h.entries().windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
    }

    #[test]
    fn test_clear() {
        let mut h = HistoryBuffer::with_capacity(8);
        h.record(at(0.0));
        h.record(at(1.0));
        h.clear();
        assert!(h.is_empty());
        assert!(h.last().is_none());
    }

    #[test]
    fn test_trim_before() {
        let mut h = HistoryBuffer::new();
        for t in 0..10 {
            h.record(at(t as f32));
        }
        h.trim_before(6.5);
        assert_eq!(h.len(), 3);
        assert_eq!(h.get(0).map(|e| e.elapsed), Some(7.0));

        // Nothing older, nothing dropped
        h.trim_before(0.0);
        assert_eq!(h.len(), 3);
    }
}
