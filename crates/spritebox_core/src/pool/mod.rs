//! # The Sprite Pool
//!
//! Composition of the four structures that must stay mutually consistent:
//! the free slot pool, the depth-ordered render list, the sprite registry
//! and the change tracker. Every public operation leaves invariants intact;
//! debug builds prove it after each structural mutation.

mod changes;
mod depth;
mod registry;
mod slots;

pub use changes::{BakeMode, ChangeTracker};
pub use depth::{DepthEntry, DepthOrder};
pub use registry::SpriteRegistry;
pub use slots::SlotPool;

use crate::error::SyncError;
use crate::sink::SpriteSink;
use crate::sprite::{SpriteHandle, SpriteState, HARDWARE_SPRITES};

/// Counters for hardware write batching.
#[derive(Clone, Copy, Debug, Default)]
pub struct BakeStats {
    /// Writes performed by the most recent flush.
    pub last_flush_writes: usize,
    /// Writes performed over the pool's lifetime.
    pub total_writes: u64,
    /// Number of flushes performed.
    pub flushes: u64,
}

/// Fixed-capacity hardware sprite pool.
///
/// Owns all sprite state and the sink it bakes into; callers hold only
/// [`SpriteHandle`]s. One instance, one logical owner (the frame loop),
/// no interior locking - every operation runs to completion synchronously.
///
/// # Errors and defects
///
/// Exhaustion is an expected condition: [`Self::alloc_sprite`] returns
/// [`SpriteHandle::NULL`] and nothing changes. Passing an invalid handle to
/// any other operation is a caller defect and panics, as does any internal
/// desync caught by the debug-build self-check.
#[derive(Debug)]
pub struct SpritePool<S: SpriteSink> {
    /// Free hardware slot numbers.
    slots: SlotPool,
    /// Depth-sorted render list.
    depth: DepthOrder,
    /// Per-sprite cached state and back-references.
    registry: SpriteRegistry,
    /// Sprites with unbaked changes.
    changes: ChangeTracker,
    /// Hardware write receiver.
    sink: S,
    /// Write batching counters.
    stats: BakeStats,
    /// Reused flush buffer; drained handles land here each frame.
    flush_scratch: Vec<SpriteHandle>,
}

impl<S: SpriteSink> SpritePool<S> {
    /// Creates a pool with the full hardware budget of
    /// [`HARDWARE_SPRITES`] slots.
    #[must_use]
    pub fn new(mode: BakeMode, sink: S) -> Self {
        Self::with_capacity(HARDWARE_SPRITES, mode, sink)
    }

    /// Creates a pool with a reduced slot budget.
    ///
    /// Capacity is fixed for the lifetime of the pool.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds [`HARDWARE_SPRITES`].
    #[must_use]
    pub fn with_capacity(capacity: usize, mode: BakeMode, sink: S) -> Self {
        assert!(capacity > 0, "capacity must be greater than zero");
        assert!(
            capacity <= HARDWARE_SPRITES,
            "capacity cannot exceed the hardware budget of {HARDWARE_SPRITES}"
        );

        Self {
            slots: SlotPool::new(capacity),
            depth: DepthOrder::new(capacity),
            registry: SpriteRegistry::new(capacity),
            changes: ChangeTracker::new(capacity, mode),
            sink,
            stats: BakeStats::default(),
            flush_scratch: Vec::with_capacity(capacity),
        }
    }

    /// Returns the fixed slot budget.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Returns the number of live sprites.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.registry.live_count()
    }

    /// Returns how many hardware slots remain free.
    #[inline]
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.slots.free_count()
    }

    /// Returns the bake policy.
    #[inline]
    #[must_use]
    pub fn bake_mode(&self) -> BakeMode {
        self.changes.mode()
    }

    /// Returns the write batching counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &BakeStats {
        &self.stats
    }

    /// Borrows the hardware sink.
    #[inline]
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Borrows the hardware sink mutably.
    ///
    /// For sinks with their own bookkeeping (clearing a recording between
    /// frames, for instance); the pool does not mind.
    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Returns the depth-ordered render list, furthest sprite first.
    #[inline]
    #[must_use]
    pub fn render_order(&self) -> &[DepthEntry] {
        self.depth.entries()
    }

    /// Checks whether a handle refers to a live sprite.
    #[inline]
    #[must_use]
    pub fn is_live(&self, handle: SpriteHandle) -> bool {
        self.registry.is_live(handle)
    }

    /// Returns a live sprite's cached visual state.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not live.
    #[inline]
    #[must_use]
    pub fn sprite_state(&self, handle: SpriteHandle) -> &SpriteState {
        &self.registry.def(handle).cache
    }

    /// Returns the hardware slot currently drawing a live sprite.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not live.
    #[must_use]
    pub fn hardware_slot(&self, handle: SpriteHandle) -> u8 {
        self.depth.entry(self.registry.def(handle).depth_index).hardware_slot
    }

    /// Allocates a sprite with the given initial state.
    ///
    /// Returns [`SpriteHandle::NULL`] when the budget is exhausted, leaving
    /// every existing sprite untouched. Callers must check validity before
    /// using the handle anywhere else.
    pub fn alloc_sprite(&mut self, state: SpriteState) -> SpriteHandle {
        let Some(slot) = self.slots.acquire() else {
            return SpriteHandle::NULL;
        };

        let handle = self.registry.alloc(state);
        if handle.is_null() {
            // Registry full; hand the slot straight back.
            self.slots.release(slot);
            return SpriteHandle::NULL;
        }

        self.depth.insert(
            state.depth(),
            handle,
            slot,
            &mut self.registry,
            &mut self.changes,
        );
        self.changes.mark(handle);

        self.debug_verify(true, true);
        self.autoflush();
        handle
    }

    /// Frees a sprite, returning its hardware slot to the pool and hiding
    /// it on screen.
    ///
    /// Mirror of allocation: the depth entry is removed with a tail-down
    /// shift, the registry slot is released for handle reuse, and any bake
    /// still pending for the sprite is withdrawn.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not live.
    pub fn free_sprite(&mut self, handle: SpriteHandle) {
        assert!(!handle.is_null(), "cannot free the null sprite handle");

        let def = self.registry.free(handle);
        let entry = self.depth.remove(def.depth_index, &mut self.registry);

        self.changes.unmark(handle);
        self.slots.release(entry.hardware_slot);
        self.sink.hide_slot(entry.hardware_slot);

        self.debug_verify(true, true);
    }

    /// Moves a sprite to a new screen position.
    ///
    /// Updates the cached state; when the vertical move changes the derived
    /// depth key, the render list is repaired around the sprite. The sprite
    /// is always marked changed (its pixels moved either way).
    ///
    /// # Panics
    ///
    /// Panics if the handle is not live.
    pub fn move_sprite(&mut self, handle: SpriteHandle, x: i16, y: i16) {
        assert!(!handle.is_null(), "cannot move the null sprite handle");

        let def = self.registry.def(handle);
        if def.cache.x == x && def.cache.y == y {
            return;
        }

        let old_depth = self.depth.entry(def.depth_index).depth;
        {
            let def = self.registry.def_mut(handle);
            def.cache.x = x;
            def.cache.y = y;
        }

        let new_depth = self.registry.def(handle).cache.depth();
        if new_depth != old_depth {
            self.set_depth_internal(handle, new_depth);
        }
        self.changes.mark(handle);

        self.debug_verify(true, true);
        self.autoflush();
    }

    /// Re-keys a sprite to a new depth.
    ///
    /// The new position is found by walking outward from the current one,
    /// then the entry is relocated and hardware order repaired locally -
    /// at most the crossed neighbors plus the sprite itself are disturbed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not live.
    pub fn set_sprite_depth(&mut self, handle: SpriteHandle, depth: u16) {
        assert!(!handle.is_null(), "cannot re-key the null sprite handle");

        self.set_depth_internal(handle, depth);

        self.debug_verify(true, true);
        self.autoflush();
    }

    /// Bakes every pending change to the hardware sink.
    ///
    /// One write per changed sprite, carrying the state *at flush time* -
    /// a sprite changed five times this frame is written once, final state
    /// only. The changed set is cleared. In immediate mode there is never
    /// anything pending, so this is a no-op.
    pub fn flush(&mut self) -> usize {
        let baked = self.flush_internal();
        tracing::debug!(changes = baked, "sprite changes baked");
        baked
    }

    /// Verifies every cross-structure invariant, returning the first
    /// violation found.
    ///
    /// Linear-ish in pool size (the duplicate-slot scan is quadratic) -
    /// this is a development and test tool, not a hot-path contract. The
    /// pool itself runs it after structural mutations in debug builds and
    /// panics on a defect.
    ///
    /// `check_hardware_order` covers slot uniqueness and strict slot
    /// ascent; `check_depth_order` covers depth-key ascent. Both are
    /// skippable because mid-operation states legitimately violate one
    /// side while the other must still hold.
    ///
    /// # Errors
    ///
    /// Returns the first [`SyncError`] detected.
    pub fn verify_sync(
        &self,
        check_hardware_order: bool,
        check_depth_order: bool,
    ) -> Result<(), SyncError> {
        let live = self.registry.live_count();
        let depth_entries = self.depth.len();
        if live != depth_entries {
            return Err(SyncError::LengthMismatch {
                live,
                depth_entries,
            });
        }

        // Registry -> depth direction.
        for (handle, def) in self.registry.iter_live() {
            if def.depth_index >= self.depth.len() {
                return Err(SyncError::DepthIndexOutOfBounds {
                    sprite: handle.index(),
                    depth_index: def.depth_index,
                });
            }
            let entry = self.depth.entry(def.depth_index);
            if entry.owner != handle {
                return Err(SyncError::OwnerMismatch {
                    sprite: handle.index(),
                    depth_index: def.depth_index,
                    owner: entry.owner.index(),
                });
            }
        }

        // Depth -> registry direction, plus ordering.
        for (index, entry) in self.depth.entries().iter().enumerate() {
            if !self.registry.is_live(entry.owner) {
                return Err(SyncError::DeadOwner { depth_index: index });
            }
            let back = self.registry.def(entry.owner).depth_index;
            if back != index {
                return Err(SyncError::BackrefMismatch {
                    depth_index: index,
                    sprite: entry.owner.index(),
                    back,
                });
            }

            if check_hardware_order {
                for (other_index, other) in
                    self.depth.entries().iter().enumerate().skip(index + 1)
                {
                    if other.hardware_slot == entry.hardware_slot {
                        return Err(SyncError::DuplicateHardwareSlot {
                            slot: entry.hardware_slot,
                            first: index,
                            second: other_index,
                        });
                    }
                }
                if self.slots.contains_free(entry.hardware_slot) {
                    return Err(SyncError::SlotBothFreeAndAssigned {
                        slot: entry.hardware_slot,
                    });
                }
            }

            if index + 1 < self.depth.len() {
                let next = self.depth.entry(index + 1);
                if check_depth_order && next.depth < entry.depth {
                    return Err(SyncError::DepthOutOfOrder { index });
                }
                if check_depth_order
                    && check_hardware_order
                    && next.hardware_slot <= entry.hardware_slot
                {
                    return Err(SyncError::HardwareOutOfOrder { index });
                }
            }
        }

        // Slot universe accounting.
        if self.slots.free_count() + self.depth.len() != self.slots.capacity() {
            return Err(SyncError::SlotAccounting {
                free: self.slots.free_count(),
                assigned: self.depth.len(),
                capacity: self.slots.capacity(),
            });
        }

        Ok(())
    }

    fn set_depth_internal(&mut self, handle: SpriteHandle, new_depth: u16) {
        let current = self.registry.def(handle).depth_index;
        let target = self.depth.neighbor_scan(current, new_depth);

        self.depth.set_depth_key(current, new_depth);
        self.depth
            .relocate(current, target, &mut self.registry, &mut self.changes);
        if current != target {
            self.depth.realign_hardware(target, &mut self.changes);
        }
    }

    fn flush_internal(&mut self) -> usize {
        let mut scratch = std::mem::take(&mut self.flush_scratch);
        scratch.clear();
        self.changes.drain_into(&mut scratch);

        for &handle in &scratch {
            let def = self.registry.def(handle);
            let slot = self.depth.entry(def.depth_index).hardware_slot;
            self.sink.write_slot(slot, &def.cache);
        }

        let baked = scratch.len();
        self.flush_scratch = scratch;

        self.stats.last_flush_writes = baked;
        self.stats.total_writes += baked as u64;
        self.stats.flushes += 1;
        baked
    }

    /// In immediate mode every mutation bakes before returning to the
    /// caller; deferred mode waits for the frame's flush.
    fn autoflush(&mut self) {
        if self.changes.mode() == BakeMode::Immediate {
            self.flush_internal();
        }
    }

    fn debug_verify(&self, check_hardware_order: bool, check_depth_order: bool) {
        if cfg!(debug_assertions) {
            if let Err(defect) = self.verify_sync(check_hardware_order, check_depth_order) {
                panic!("sprite pool out of sync: {defect}");
            }
        }
    }
}
