//! # Sprite Handles and Cached State
//!
//! A sprite is referenced by a lightweight [`SpriteHandle`] and described by
//! a [`SpriteState`] - the pool keeps the only authoritative copy of the
//! state and hands out non-owning handles.

use bytemuck::{Pod, Zeroable};

/// Number of hardware sprite slots the video hardware provides.
///
/// This is the budget for the whole process lifetime. Pools may be built
/// smaller for tests, never larger.
pub const HARDWARE_SPRITES: usize = 256;

/// Vertical coordinate that parks a sprite off the visible screen.
///
/// Writing a state with this `y` is how a slot is hidden.
pub const OFFSCREEN_Y: i16 = 400;

/// Opaque reference to a live sprite in the pool.
///
/// Handles carry a validity sentinel: [`SpriteHandle::NULL`] means
/// "no sprite" and is what allocation returns when the budget is exhausted.
/// Equality is by index. A handle is never reused while its sprite is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct SpriteHandle(u16);

impl SpriteHandle {
    /// Null/invalid sprite handle.
    pub const NULL: Self = Self(u16::MAX);

    /// Creates a handle for a registry index.
    #[inline]
    #[must_use]
    pub(crate) const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the registry index this handle refers to.
    ///
    /// Only meaningful for non-null handles; exposed for diagnostics.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks if this handle is the null sentinel.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u16::MAX
    }
}

impl Default for SpriteHandle {
    fn default() -> Self {
        Self::NULL
    }
}

/// Cached visual state of one sprite.
///
/// This is the exact payload a hardware write carries: screen position,
/// character image index and palette index. Plain old data so the pool can
/// store it in flat pre-allocated arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct SpriteState {
    /// Horizontal screen coordinate.
    pub x: i16,
    /// Vertical screen coordinate. Also the source of the depth key.
    pub y: i16,
    /// Character image index.
    pub image: u8,
    /// Palette index for the image.
    pub palette: u8,
}

impl SpriteState {
    /// Creates a new sprite state.
    #[inline]
    #[must_use]
    pub const fn new(x: i16, y: i16, image: u8, palette: u8) -> Self {
        Self {
            x,
            y,
            image,
            palette,
        }
    }

    /// Derives the depth key from the cached position.
    ///
    /// Depth is a monotonic function of `y`: sprites lower on screen draw
    /// in front. Offset-binary encoding keeps the whole signed range
    /// ordered instead of letting negative rows wrap to the far end.
    #[inline]
    #[must_use]
    pub const fn depth(self) -> u16 {
        (self.y as u16) ^ 0x8000
    }
}

impl Default for SpriteState {
    /// A default sprite is parked offscreen, matching what a hidden
    /// hardware slot shows.
    fn default() -> Self {
        Self::new(0, OFFSCREEN_Y, 0, 0)
    }
}
