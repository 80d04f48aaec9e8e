//! # Sync Defects
//!
//! Structural defects the pool's self-check can detect. These are bugs in
//! the pool or its caller, never environmental conditions - the public
//! operations panic on them rather than attempting recovery.

use thiserror::Error;

/// Structural defect found by [`SpritePool::verify_sync`].
///
/// Each variant corresponds to one of the pool's cross-structure
/// invariants. The checker returns the first violation it finds.
///
/// [`SpritePool::verify_sync`]: crate::SpritePool::verify_sync
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Registry and depth list disagree about how many sprites are live.
    #[error("registry holds {live} live sprites but depth list has {depth_entries} entries")]
    LengthMismatch {
        /// Live sprites in the registry.
        live: usize,
        /// Entries in the depth list.
        depth_entries: usize,
    },

    /// A sprite's depth back-reference points outside the depth list.
    #[error("sprite {sprite} has depth index {depth_index} out of bounds")]
    DepthIndexOutOfBounds {
        /// Registry index of the sprite.
        sprite: usize,
        /// The out-of-range depth index.
        depth_index: usize,
    },

    /// A sprite's depth entry is owned by a different sprite.
    #[error("sprite {sprite} points at depth entry {depth_index}, which is owned by sprite {owner}")]
    OwnerMismatch {
        /// Registry index of the sprite.
        sprite: usize,
        /// Depth index the sprite claims.
        depth_index: usize,
        /// Actual owner recorded in that depth entry.
        owner: usize,
    },

    /// A depth entry's owner is not a live sprite.
    #[error("depth entry {depth_index} is owned by a dead or invalid sprite")]
    DeadOwner {
        /// Index of the offending depth entry.
        depth_index: usize,
    },

    /// A depth entry's owner does not point back at it.
    #[error("depth entry {depth_index} is owned by sprite {sprite}, which points back at {back}")]
    BackrefMismatch {
        /// Index of the offending depth entry.
        depth_index: usize,
        /// Registry index of the owner.
        sprite: usize,
        /// Depth index the owner actually records.
        back: usize,
    },

    /// Two depth entries carry the same hardware slot.
    #[error("hardware slot {slot} assigned to both depth entries {first} and {second}")]
    DuplicateHardwareSlot {
        /// The duplicated slot number.
        slot: u8,
        /// First depth entry carrying it.
        first: usize,
        /// Second depth entry carrying it.
        second: usize,
    },

    /// Depth keys are not ascending along the depth list.
    #[error("depth key out of order at depth entry {index}")]
    DepthOutOfOrder {
        /// First index of the offending adjacent pair.
        index: usize,
    },

    /// Hardware slots are not strictly ascending along the depth list.
    #[error("hardware slot out of order at depth entry {index}")]
    HardwareOutOfOrder {
        /// First index of the offending adjacent pair.
        index: usize,
    },

    /// Free and assigned slots do not partition the slot universe.
    #[error("slot universe broken: {free} free + {assigned} assigned != capacity {capacity}")]
    SlotAccounting {
        /// Slots in the free set.
        free: usize,
        /// Slots assigned to depth entries.
        assigned: usize,
        /// Total slot universe.
        capacity: usize,
    },

    /// A slot is both in the free set and assigned to a depth entry.
    #[error("hardware slot {slot} is both free and assigned")]
    SlotBothFreeAndAssigned {
        /// The doubly-accounted slot number.
        slot: u8,
    },
}
