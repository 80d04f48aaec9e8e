//! # Change Tracker
//!
//! Accumulates the set of sprites whose on-screen representation changed
//! since the last bake. Set semantics: marking a sprite twice in one frame
//! still costs exactly one hardware write.

use crate::sprite::SpriteHandle;

/// When hardware writes happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BakeMode {
    /// Every mutating pool operation writes to the sink before returning.
    Immediate,
    /// Changes accumulate and a single flush per frame writes them all.
    ///
    /// This is the batching win: a sprite moved N times in a frame is
    /// baked once, reflecting its final state.
    Deferred,
}

/// Changed-sprite set with stable iteration order.
///
/// A bitset gives O(1) membership and dedup; a side list preserves the
/// order sprites were first marked so flushes are deterministic.
#[derive(Debug)]
pub struct ChangeTracker {
    /// Bake policy, fixed at construction.
    mode: BakeMode,
    /// Bitset: 1 = changed. 64 sprites per word.
    bits: Vec<u64>,
    /// Handles in first-marked order; may contain since-unmarked entries,
    /// which the drain skips.
    changed: Vec<SpriteHandle>,
    /// Cached count of marked sprites.
    marked_count: usize,
}

impl ChangeTracker {
    /// Creates a tracker for `capacity` sprites.
    #[must_use]
    pub fn new(capacity: usize, mode: BakeMode) -> Self {
        let word_count = capacity.div_ceil(64);
        Self {
            mode,
            bits: vec![0_u64; word_count],
            changed: Vec::with_capacity(capacity),
            marked_count: 0,
        }
    }

    /// Returns the bake policy this tracker was built with.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> BakeMode {
        self.mode
    }

    /// Returns the number of sprites currently marked.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.marked_count
    }

    /// Checks if no sprite is marked.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.marked_count == 0
    }

    /// Checks whether a sprite is marked.
    #[inline]
    #[must_use]
    pub fn is_marked(&self, handle: SpriteHandle) -> bool {
        let (word, bit) = Self::locate(handle);
        self.bits[word] & bit != 0
    }

    /// Marks a sprite as changed. Marking twice is a no-op.
    pub fn mark(&mut self, handle: SpriteHandle) {
        let (word, bit) = Self::locate(handle);
        if self.bits[word] & bit == 0 {
            self.bits[word] |= bit;
            self.changed.push(handle);
            self.marked_count += 1;
        }
    }

    /// Withdraws a pending mark, if any.
    ///
    /// Needed when a sprite is freed with a change still queued: a dead
    /// handle must never reach the bake loop.
    pub fn unmark(&mut self, handle: SpriteHandle) {
        let (word, bit) = Self::locate(handle);
        if self.bits[word] & bit != 0 {
            self.bits[word] &= !bit;
            self.marked_count -= 1;
        }
    }

    /// Moves every marked handle into `out` in first-marked order and
    /// clears the tracker.
    pub fn drain_into(&mut self, out: &mut Vec<SpriteHandle>) {
        for handle in self.changed.drain(..) {
            let (word, bit) = Self::locate(handle);
            if self.bits[word] & bit != 0 {
                self.bits[word] &= !bit;
                out.push(handle);
            }
        }
        self.marked_count = 0;
    }

    #[inline]
    fn locate(handle: SpriteHandle) -> (usize, u64) {
        let index = handle.index();
        (index / 64, 1_u64 << (index % 64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(index: u16) -> SpriteHandle {
        // Round-trip through the tracker only needs the index.
        SpriteHandle::new(index)
    }

    #[test]
    fn test_mark_has_set_semantics() {
        let mut tracker = ChangeTracker::new(128, BakeMode::Deferred);
        tracker.mark(handle(5));
        tracker.mark(handle(5));
        tracker.mark(handle(70));
        assert_eq!(tracker.len(), 2);

        let mut drained = Vec::new();
        tracker.drain_into(&mut drained);
        assert_eq!(drained, vec![handle(5), handle(70)]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_unmark_withdraws_pending_change() {
        let mut tracker = ChangeTracker::new(64, BakeMode::Deferred);
        tracker.mark(handle(1));
        tracker.mark(handle(2));
        tracker.unmark(handle(1));
        assert_eq!(tracker.len(), 1);

        let mut drained = Vec::new();
        tracker.drain_into(&mut drained);
        assert_eq!(drained, vec![handle(2)]);
    }

    #[test]
    fn test_drain_preserves_first_marked_order() {
        let mut tracker = ChangeTracker::new(64, BakeMode::Deferred);
        tracker.mark(handle(9));
        tracker.mark(handle(3));
        tracker.mark(handle(9));

        let mut drained = Vec::new();
        tracker.drain_into(&mut drained);
        assert_eq!(drained, vec![handle(9), handle(3)]);
    }
}
