//! # Depth-Ordered Render List
//!
//! One entry per live sprite, sorted ascending by depth key, with the
//! hardware slot assigned to each position riding along. Draw order on the
//! hardware side must match depth order exactly (slot numbers strictly
//! ascending along the list), and every structural change repairs that
//! locally - a sprite crossing K neighbors touches K+1 entries, never the
//! whole list.

use crate::pool::changes::ChangeTracker;
use crate::pool::registry::SpriteRegistry;
use crate::sprite::SpriteHandle;

/// One position in the depth-sorted render list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthEntry {
    /// Depth key; ascending along the list. Ties keep insertion order.
    pub depth: u16,
    /// Hardware slot currently drawing at this position; strictly
    /// ascending along the list.
    pub hardware_slot: u8,
    /// Sprite occupying this position.
    pub owner: SpriteHandle,
}

/// Depth-sorted sequence of all live sprites.
#[derive(Debug)]
pub struct DepthOrder {
    /// Contiguous, sorted by `depth` ascending.
    entries: Vec<DepthEntry>,
}

impl DepthOrder {
    /// Creates an empty list pre-sized for `capacity` sprites.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the list is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at a position.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn entry(&self, index: usize) -> &DepthEntry {
        &self.entries[index]
    }

    /// Returns the whole list, front (furthest) first.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[DepthEntry] {
        &self.entries
    }

    /// Finds the position a new depth key inserts at.
    ///
    /// First position whose key is strictly greater, so a new sprite lands
    /// after every existing sprite with an equal key - same-depth render
    /// order is insertion order, deterministically. Linear scan from the
    /// front; at this capacity a binary search buys nothing, and behavior
    /// would be identical.
    #[must_use]
    pub fn insertion_index(&self, depth: u16) -> usize {
        self.entries
            .iter()
            .position(|entry| depth < entry.depth)
            .unwrap_or(self.entries.len())
    }

    /// Finds the minimal-disturbance position for an existing entry's new
    /// depth key by walking outward from its current position one neighbor
    /// at a time.
    #[must_use]
    pub(crate) fn neighbor_scan(&self, current: usize, new_depth: u16) -> usize {
        let mut target = current;
        while target > 0 && new_depth < self.entries[target - 1].depth {
            target -= 1;
        }
        while target + 1 < self.entries.len() && new_depth > self.entries[target + 1].depth {
            target += 1;
        }
        target
    }

    /// Overwrites the depth key at a position, leaving order repair to the
    /// caller.
    pub(crate) fn set_depth_key(&mut self, index: usize, depth: u16) {
        self.entries[index].depth = depth;
    }

    /// Inserts a new sprite at its sorted position and realigns hardware
    /// order around it.
    ///
    /// The entry is appended at the tail, relocated into place, and the
    /// realignment pass always runs: the fresh hardware slot is an
    /// arbitrary number, so it is out of place even when the tail happens
    /// to be the sorted position.
    pub(crate) fn insert(
        &mut self,
        depth: u16,
        owner: SpriteHandle,
        hardware_slot: u8,
        registry: &mut SpriteRegistry,
        changes: &mut ChangeTracker,
    ) -> usize {
        let target = self.insertion_index(depth);
        let tail = self.entries.len();

        self.entries.push(DepthEntry {
            depth,
            hardware_slot,
            owner,
        });
        registry.set_depth_index(owner, tail);

        self.relocate(tail, target, registry, changes);
        self.realign_hardware(target, changes);

        target
    }

    /// Moves the entry at `from` to `to`, shifting everything in between
    /// by one position.
    ///
    /// O(distance), not O(len). Every shifted sprite's back-reference is
    /// updated and the sprite marked changed - its position in the draw
    /// sequence moved even though its own depth key did not. The moved
    /// sprite is marked too. Hardware order is left broken at `to`; run
    /// [`Self::realign_hardware`] afterwards.
    pub(crate) fn relocate(
        &mut self,
        from: usize,
        to: usize,
        registry: &mut SpriteRegistry,
        changes: &mut ChangeTracker,
    ) {
        if from == to {
            return;
        }

        let moving = self.entries[from];

        if to < from {
            // Shift [to, from) one position toward the back.
            let mut index = from;
            while index > to {
                self.entries[index] = self.entries[index - 1];
                let owner = self.entries[index].owner;
                registry.set_depth_index(owner, index);
                changes.mark(owner);
                index -= 1;
            }
        } else {
            // Shift (from, to] one position toward the front.
            for index in from..to {
                self.entries[index] = self.entries[index + 1];
                let owner = self.entries[index].owner;
                registry.set_depth_index(owner, index);
                changes.mark(owner);
            }
        }

        self.entries[to] = moving;
        registry.set_depth_index(moving.owner, to);
        changes.mark(moving.owner);
    }

    /// Bounded bubble pass restoring strictly-ascending hardware slots
    /// around one out-of-place position.
    ///
    /// Walks backward swapping slot numbers while the left neighbor's is
    /// greater, then forward symmetrically. Only the entry at `position`
    /// can be out of place, so the pass terminates after at most `len`
    /// swaps and typically after a handful. Each swap changes what both
    /// slots draw, so both owners are marked.
    pub(crate) fn realign_hardware(&mut self, position: usize, changes: &mut ChangeTracker) {
        let mut index = position;

        while index > 0 && self.entries[index - 1].hardware_slot > self.entries[index].hardware_slot
        {
            let left = self.entries[index - 1].hardware_slot;
            self.entries[index - 1].hardware_slot = self.entries[index].hardware_slot;
            self.entries[index].hardware_slot = left;
            changes.mark(self.entries[index - 1].owner);
            changes.mark(self.entries[index].owner);
            index -= 1;
        }

        while index + 1 < self.entries.len()
            && self.entries[index].hardware_slot > self.entries[index + 1].hardware_slot
        {
            let right = self.entries[index + 1].hardware_slot;
            self.entries[index + 1].hardware_slot = self.entries[index].hardware_slot;
            self.entries[index].hardware_slot = right;
            changes.mark(self.entries[index + 1].owner);
            changes.mark(self.entries[index].owner);
            index += 1;
        }
    }

    /// Removes the entry at a position, shifting the tail down one.
    ///
    /// Mirror of insertion. Shifted sprites keep their hardware slots, so
    /// strict slot order survives removal and nothing visual changes for
    /// them - only back-references need fixing.
    pub(crate) fn remove(&mut self, index: usize, registry: &mut SpriteRegistry) -> DepthEntry {
        let removed = self.entries.remove(index);
        for position in index..self.entries.len() {
            registry.set_depth_index(self.entries[position].owner, position);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::changes::BakeMode;
    use crate::sprite::SpriteState;

    struct Fixture {
        depth: DepthOrder,
        registry: SpriteRegistry,
        changes: ChangeTracker,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                depth: DepthOrder::new(16),
                registry: SpriteRegistry::new(16),
                changes: ChangeTracker::new(16, BakeMode::Deferred),
            }
        }

        fn insert(&mut self, depth: u16, slot: u8) -> SpriteHandle {
            let owner = self.registry.alloc(SpriteState::default());
            self.depth
                .insert(depth, owner, slot, &mut self.registry, &mut self.changes);
            owner
        }

        fn depths(&self) -> Vec<u16> {
            self.depth.entries().iter().map(|e| e.depth).collect()
        }

        fn slots(&self) -> Vec<u8> {
            self.depth
                .entries()
                .iter()
                .map(|e| e.hardware_slot)
                .collect()
        }
    }

    #[test]
    fn test_insertion_index_goes_after_equal_keys() {
        let mut fx = Fixture::new();
        fx.insert(10, 0);
        fx.insert(30, 1);
        assert_eq!(fx.depth.insertion_index(10), 1);
        assert_eq!(fx.depth.insertion_index(5), 0);
        assert_eq!(fx.depth.insertion_index(40), 2);
    }

    #[test]
    fn test_insert_keeps_both_orders() {
        let mut fx = Fixture::new();
        fx.insert(50, 0);
        fx.insert(10, 1);
        fx.insert(30, 2);

        assert_eq!(fx.depths(), vec![10, 30, 50]);
        assert_eq!(fx.slots(), vec![0, 1, 2]);
    }

    #[test]
    fn test_backrefs_track_relocation() {
        let mut fx = Fixture::new();
        let a = fx.insert(50, 0);
        let b = fx.insert(10, 1);
        let c = fx.insert(30, 2);

        assert_eq!(fx.registry.def(b).depth_index, 0);
        assert_eq!(fx.registry.def(c).depth_index, 1);
        assert_eq!(fx.registry.def(a).depth_index, 2);
        assert_eq!(fx.depth.entry(0).owner, b);
        assert_eq!(fx.depth.entry(2).owner, a);
    }

    #[test]
    fn test_neighbor_scan_walks_both_ways() {
        let mut fx = Fixture::new();
        fx.insert(10, 0);
        fx.insert(20, 1);
        fx.insert(30, 2);
        fx.insert(40, 3);

        // Entry at index 2 (depth 30) retargeted.
        assert_eq!(fx.depth.neighbor_scan(2, 5), 0);
        assert_eq!(fx.depth.neighbor_scan(2, 25), 2);
        assert_eq!(fx.depth.neighbor_scan(2, 45), 3);
    }

    #[test]
    fn test_remove_fixes_backrefs_and_keeps_slot_order() {
        let mut fx = Fixture::new();
        fx.insert(10, 0);
        let b = fx.insert(20, 1);
        let c = fx.insert(30, 2);

        let removed = fx
            .depth
            .remove(fx.registry.def(b).depth_index, &mut fx.registry);
        assert_eq!(removed.owner, b);
        assert_eq!(fx.depths(), vec![10, 30]);
        assert_eq!(fx.slots(), vec![0, 2]);
        assert_eq!(fx.registry.def(c).depth_index, 1);
    }
}
