//! # Hardware Sink Boundary
//!
//! The pool never talks to video hardware directly; it writes through a
//! [`SpriteSink`]. Writes are bounded, infallible and idempotent - the sink
//! unconditionally overwrites whatever the slot showed before.

use crate::sprite::SpriteState;

/// Receiver for hardware sprite writes.
///
/// Implementations wrap the real sprite registers, an emulator, or a test
/// double. The contract is minimal on purpose: both calls always succeed
/// and overwrite the slot's previous rendering state.
pub trait SpriteSink {
    /// Overwrites the rendering state of a hardware slot.
    fn write_slot(&mut self, slot: u8, state: &SpriteState);

    /// Makes a hardware slot render nothing.
    ///
    /// Equivalent to writing a state parked offscreen; used when a sprite
    /// is freed.
    fn hide_slot(&mut self, slot: u8);
}

/// Sink that discards every write.
///
/// Used by headless runs and benchmarks where only the pool's bookkeeping
/// matters.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl SpriteSink for NullSink {
    #[inline]
    fn write_slot(&mut self, _slot: u8, _state: &SpriteState) {}

    #[inline]
    fn hide_slot(&mut self, _slot: u8) {}
}

/// One recorded hardware access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    /// A slot was overwritten with a sprite state.
    Write {
        /// Slot that was written.
        slot: u8,
        /// State it now shows.
        state: SpriteState,
    },
    /// A slot was hidden.
    Hide {
        /// Slot that was hidden.
        slot: u8,
    },
}

/// Sink that records every access in order.
///
/// The test double for the hardware boundary: tests assert on the exact
/// sequence and count of writes the pool produced.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Number of `Write` events recorded for one slot.
    #[must_use]
    pub fn writes_to(&self, slot: u8) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, SinkEvent::Write { slot: s, .. } if *s == slot))
            .count()
    }

    /// Last state written to a slot, if any.
    #[must_use]
    pub fn last_write(&self, slot: u8) -> Option<SpriteState> {
        self.events.iter().rev().find_map(|event| match event {
            SinkEvent::Write { slot: s, state } if *s == slot => Some(*state),
            _ => None,
        })
    }

    /// Forgets everything recorded so far.
    ///
    /// Lets a test isolate the writes of a single frame.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl SpriteSink for RecordingSink {
    fn write_slot(&mut self, slot: u8, state: &SpriteState) {
        self.events.push(SinkEvent::Write {
            slot,
            state: *state,
        });
    }

    fn hide_slot(&mut self, slot: u8) {
        self.events.push(SinkEvent::Hide { slot });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_orders_events() {
        let mut sink = RecordingSink::new();
        sink.write_slot(3, &SpriteState::new(1, 2, 0, 0));
        sink.write_slot(3, &SpriteState::new(5, 6, 0, 0));
        sink.hide_slot(3);

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.writes_to(3), 2);
        assert_eq!(sink.last_write(3), Some(SpriteState::new(5, 6, 0, 0)));
        assert_eq!(sink.events()[2], SinkEvent::Hide { slot: 3 });
    }
}
