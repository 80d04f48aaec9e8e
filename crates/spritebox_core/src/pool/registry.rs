//! # Sprite Registry
//!
//! One entry per live sprite: the cached visual state the hardware writes
//! are built from, plus the back-reference into the depth list. Storage is
//! fixed-capacity with stable indices so handles stay valid for the whole
//! life of a sprite.

use crate::sprite::{SpriteHandle, SpriteState};

/// Registry entry for one live sprite.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SpriteDef {
    /// Cached visual state; the only authoritative copy.
    pub cache: SpriteState,
    /// Index of this sprite's entry in the depth list.
    pub depth_index: usize,
}

/// Fixed-capacity storage of live sprites.
///
/// Slot storage with a LIFO free-handle list: freeing a sprite never moves
/// any other sprite, so outstanding handles are undisturbed.
#[derive(Debug)]
pub struct SpriteRegistry {
    /// Pre-allocated sprite slots.
    defs: Box<[Option<SpriteDef>]>,
    /// Free handle indices for reuse.
    free_handles: Vec<u16>,
    /// Number of live sprites.
    live_count: usize,
    /// Maximum capacity.
    capacity: usize,
}

impl SpriteRegistry {
    /// Sentinel depth index for an entry not yet linked into the depth list.
    const UNLINKED: usize = usize::MAX;

    /// Creates a registry with room for `capacity` sprites.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit a `u16` handle.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "registry capacity must be greater than zero");
        assert!(
            capacity < u16::MAX as usize,
            "registry capacity must fit a u16 handle"
        );

        let defs: Vec<Option<SpriteDef>> = (0..capacity).map(|_| None).collect();

        #[allow(clippy::cast_possible_truncation)]
        let free_handles: Vec<u16> = (0..capacity).rev().map(|index| index as u16).collect();

        Self {
            defs: defs.into_boxed_slice(),
            free_handles,
            live_count: 0,
            capacity,
        }
    }

    /// Returns the maximum number of sprites.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of live sprites.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Checks whether a handle refers to a live sprite.
    #[inline]
    #[must_use]
    pub fn is_live(&self, handle: SpriteHandle) -> bool {
        !handle.is_null()
            && handle.index() < self.capacity
            && self.defs[handle.index()].is_some()
    }

    /// Stores a new sprite, returning its handle.
    ///
    /// Returns [`SpriteHandle::NULL`] when the registry is full. The entry
    /// starts unlinked; the caller links it into the depth list immediately.
    pub(crate) fn alloc(&mut self, cache: SpriteState) -> SpriteHandle {
        let Some(index) = self.free_handles.pop() else {
            return SpriteHandle::NULL;
        };

        self.defs[index as usize] = Some(SpriteDef {
            cache,
            depth_index: Self::UNLINKED,
        });
        self.live_count += 1;

        SpriteHandle::new(index)
    }

    /// Removes a sprite, releasing its handle for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not live - freeing a dead sprite is a
    /// caller defect.
    pub(crate) fn free(&mut self, handle: SpriteHandle) -> SpriteDef {
        let def = self.defs[handle.index()]
            .take()
            .unwrap_or_else(|| panic!("freed sprite handle {} is not live", handle.index()));

        #[allow(clippy::cast_possible_truncation)]
        self.free_handles.push(handle.index() as u16);
        self.live_count -= 1;

        def
    }

    /// Looks up a live sprite's entry.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not live.
    #[inline]
    pub(crate) fn def(&self, handle: SpriteHandle) -> &SpriteDef {
        self.defs[handle.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("sprite handle {} is not live", handle.index()))
    }

    /// Looks up a live sprite's entry mutably.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not live.
    #[inline]
    pub(crate) fn def_mut(&mut self, handle: SpriteHandle) -> &mut SpriteDef {
        self.defs[handle.index()]
            .as_mut()
            .unwrap_or_else(|| panic!("sprite handle {} is not live", handle.index()))
    }

    /// Updates a sprite's depth list back-reference.
    #[inline]
    pub(crate) fn set_depth_index(&mut self, handle: SpriteHandle, depth_index: usize) {
        self.def_mut(handle).depth_index = depth_index;
    }

    /// Iterates over all live sprites.
    pub(crate) fn iter_live(&self) -> impl Iterator<Item = (SpriteHandle, &SpriteDef)> {
        self.defs.iter().enumerate().filter_map(|(index, slot)| {
            #[allow(clippy::cast_possible_truncation)]
            slot.as_ref()
                .map(|def| (SpriteHandle::new(index as u16), def))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_until_full() {
        let mut registry = SpriteRegistry::new(2);
        let a = registry.alloc(SpriteState::default());
        let b = registry.alloc(SpriteState::default());
        assert!(!a.is_null());
        assert!(!b.is_null());
        assert_ne!(a, b);
        assert!(registry.alloc(SpriteState::default()).is_null());
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn test_free_reuses_handle_without_moving_others() {
        let mut registry = SpriteRegistry::new(3);
        let a = registry.alloc(SpriteState::new(1, 1, 0, 0));
        let b = registry.alloc(SpriteState::new(2, 2, 0, 0));

        registry.free(a);
        assert!(!registry.is_live(a));
        assert!(registry.is_live(b));
        assert_eq!(registry.def(b).cache, SpriteState::new(2, 2, 0, 0));

        // LIFO: the freed handle comes straight back.
        let c = registry.alloc(SpriteState::new(3, 3, 0, 0));
        assert_eq!(c.index(), a.index());
    }

    #[test]
    #[should_panic(expected = "is not live")]
    fn test_dead_handle_lookup_is_fatal() {
        let mut registry = SpriteRegistry::new(2);
        let a = registry.alloc(SpriteState::default());
        registry.free(a);
        let _ = registry.def(a);
    }
}
