//! FIFO Tracker Module
//!
//! Tracks insertion order for working-set eviction.

use std::collections::VecDeque;

use crate::fingerprint::Fingerprint;

// == FIFO Tracker ==
/// Tracks fingerprint insertion order for FIFO eviction.
///
/// Fingerprints are stored in a VecDeque where:
/// - Front = Most recently inserted
/// - Back = Oldest insertion
///
/// Position is fixed at first insertion. Reads never reorder entries, so
/// eviction is strictly first-in first-out.
#[derive(Debug, Default)]
pub struct FifoTracker {
    /// Fingerprints in insertion order
    order: VecDeque<Fingerprint>,
}

impl FifoTracker {
    // == Constructor ==
    /// Creates a new empty FIFO tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Records a fingerprint at the front (newest position).
    ///
    /// If the fingerprint is already tracked, its position is left alone.
    pub fn record(&mut self, fingerprint: &Fingerprint) {
        if self.contains(fingerprint) {
            return;
        }
        self.order.push_front(fingerprint.clone());
    }

    // == Remove ==
    /// Removes a fingerprint from the tracker.
    pub fn remove(&mut self, fingerprint: &Fingerprint) {
        self.order.retain(|f| f != fingerprint);
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest tracked fingerprint.
    ///
    /// Returns None if the tracker is empty.
    pub fn pop_oldest(&mut self) -> Option<Fingerprint> {
        self.order.pop_back()
    }

    // == Peek Oldest ==
    /// Returns the oldest tracked fingerprint without removing it.
    pub fn peek_oldest(&self) -> Option<&Fingerprint> {
        self.order.back()
    }

    // == Length ==
    /// Returns the number of tracked fingerprints.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a fingerprint is being tracked.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.order.iter().any(|f| f == fingerprint)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn fp(text: &str) -> Fingerprint {
        Fingerprint::of(text)
    }

    #[test]
    fn test_fifo_new() {
        let fifo = FifoTracker::new();
        assert!(fifo.is_empty());
        assert_eq!(fifo.len(), 0);
    }

    #[test]
    fn test_fifo_record_preserves_insertion_order() {
        let mut fifo = FifoTracker::new();

        fifo.record(&fp("a"));
        fifo.record(&fp("b"));
        fifo.record(&fp("c"));

        assert_eq!(fifo.len(), 3);
        // "a" was inserted first, so it is oldest
        assert_eq!(fifo.peek_oldest(), Some(&fp("a")));
    }

    #[test]
    fn test_fifo_rerecord_does_not_reposition() {
        let mut fifo = FifoTracker::new();

        fifo.record(&fp("a"));
        fifo.record(&fp("b"));
        fifo.record(&fp("c"));

        // Recording "a" again leaves it in its original slot
        fifo.record(&fp("a"));

        assert_eq!(fifo.len(), 3);
        assert_eq!(fifo.pop_oldest(), Some(fp("a")));
        assert_eq!(fifo.pop_oldest(), Some(fp("b")));
        assert_eq!(fifo.pop_oldest(), Some(fp("c")));
    }

    #[test]
    fn test_fifo_pop_oldest() {
        let mut fifo = FifoTracker::new();

        fifo.record(&fp("a"));
        fifo.record(&fp("b"));

        assert_eq!(fifo.pop_oldest(), Some(fp("a")));
        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.pop_oldest(), Some(fp("b")));
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_fifo_pop_empty() {
        let mut fifo = FifoTracker::new();
        assert_eq!(fifo.pop_oldest(), None);
    }

    #[test]
    fn test_fifo_remove() {
        let mut fifo = FifoTracker::new();

        fifo.record(&fp("a"));
        fifo.record(&fp("b"));
        fifo.record(&fp("c"));

        fifo.remove(&fp("b"));

        assert_eq!(fifo.len(), 2);
        assert!(!fifo.contains(&fp("b")));
        assert_eq!(fifo.pop_oldest(), Some(fp("a")));
        assert_eq!(fifo.pop_oldest(), Some(fp("c")));
    }

    #[test]
    fn test_fifo_remove_nonexistent() {
        let mut fifo = FifoTracker::new();

        fifo.record(&fp("a"));
        fifo.remove(&fp("missing"));

        assert_eq!(fifo.len(), 1);
        assert!(fifo.contains(&fp("a")));
    }

    #[test]
    fn test_fifo_record_same_key_keeps_one_entry() {
        let mut fifo = FifoTracker::new();

        fifo.record(&fp("a"));
        fifo.record(&fp("a"));
        fifo.record(&fp("a"));

        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.pop_oldest(), Some(fp("a")));
        assert!(fifo.is_empty());
    }
}
