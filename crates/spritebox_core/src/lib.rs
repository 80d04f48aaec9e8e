//! # SPRITEBOX Core
//!
//! Fixed-capacity hardware sprite pool designed for:
//! - A hard budget of 256 hardware sprites, fixed for the process lifetime
//! - Draw order that always matches depth order, repaired locally
//! - At most one hardware write per sprite per frame in deferred mode
//!
//! ## Architecture Rules
//!
//! 1. **No allocations after construction** - every structure is pre-sized
//! 2. **Local repair, never a full resort** - a depth change only touches
//!    the entries it crosses
//! 3. **The sink is injected** - hardware access goes through [`SpriteSink`],
//!    there is no global pool
//!
//! ## Example
//!
//! ```rust,ignore
//! use spritebox_core::{BakeMode, NullSink, SpritePool, SpriteState};
//!
//! let mut pool = SpritePool::new(BakeMode::Deferred, NullSink);
//! let sprite = pool.alloc_sprite(SpriteState::new(100, 60, 3, 1));
//! pool.move_sprite(sprite, 104, 58);
//! pool.flush(); // one hardware write, reflecting the final position
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod pool;
pub mod sink;
pub mod sprite;

pub use error::SyncError;
pub use pool::{
    BakeMode, BakeStats, ChangeTracker, DepthEntry, DepthOrder, SlotPool, SpritePool,
    SpriteRegistry,
};
pub use sink::{NullSink, RecordingSink, SinkEvent, SpriteSink};
pub use sprite::{SpriteHandle, SpriteState, HARDWARE_SPRITES, OFFSCREEN_Y};
