//! # SPRITEBOX Game Layer
//!
//! The consumers of the sprite pool: input polling, pairwise sphere
//! physics and the arena frame loop that drives them in the one order the
//! pool's batching contract requires - every logical mutation first, one
//! flush at the end of the frame.
//!
//! ## Frame Orchestration
//!
//! ```text
//! Frame N:
//! ┌──────────────────────────────────────────────────────┐
//! │ 1. INPUT      poll sources, derive pressed/released  │
//! │ 2. FORCES     input direction becomes force          │
//! │ 3. COLLIDE    pairwise sphere tests, impulse response│
//! │ 4. INTEGRATE  velocity, friction, move sprites       │
//! │ 5. BAKE       pool.flush() - one write per sprite    │
//! └──────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod arena;
pub mod input;
pub mod physics;

pub use arena::{Arena, ArenaConfig, ConfigError, FrameStats};
pub use input::{Button, Input, InputSource, ScriptedInput};
pub use physics::{CollisionShape, Intersection, PhysicsBody};
