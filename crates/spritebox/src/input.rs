//! # Input Polling
//!
//! A thin abstraction over whatever produces button state: a gamepad, an
//! emulator shim, or a scripted sequence in tests. The game only ever sees
//! debounced down/pressed/released bits.

/// Inverse of the unit diagonal length, so holding two directions does not
/// move √2 times faster than one.
const DIAGONAL_SCALE: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Logical buttons, one bit each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    /// Move up.
    Up,
    /// Move down.
    Down,
    /// Move left.
    Left,
    /// Move right.
    Right,
    /// Punch.
    Punch,
}

impl Button {
    /// Returns this button's bit in a packed button byte.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Up => 1 << 0,
            Self::Down => 1 << 1,
            Self::Left => 1 << 2,
            Self::Right => 1 << 3,
            Self::Punch => 1 << 4,
        }
    }
}

/// Producer of raw button state, polled once per frame.
pub trait InputSource {
    /// Returns the currently-held buttons as packed bits.
    fn button_bits(&mut self) -> u8;
}

/// Edge-detecting input state for one player.
///
/// `pressed` and `released` are single-frame edges derived by XOR against
/// the previous frame's held bits; `down` is level state.
#[derive(Default)]
pub struct Input {
    source: Option<Box<dyn InputSource>>,
    down: u8,
    pressed: u8,
    released: u8,
}

impl Input {
    /// Creates an input with no source; every button reads as up.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches (or replaces) the source this input polls.
    pub fn set_source(&mut self, source: Box<dyn InputSource>) {
        self.source = Some(source);
    }

    /// Polls the source and recomputes edges. Call exactly once per frame.
    pub fn update(&mut self) {
        let bits = self.source.as_mut().map_or(0, |source| source.button_bits());
        self.on_new_bits(bits);
    }

    /// Feeds raw bits directly, bypassing the source.
    pub fn on_new_bits(&mut self, bits: u8) {
        self.pressed = (bits ^ self.down) & bits;
        self.released = (bits ^ self.down) & self.down;
        self.down = bits;
    }

    /// Checks if a button is currently held.
    #[inline]
    #[must_use]
    pub const fn is_down(&self, button: Button) -> bool {
        self.down & button.bit() != 0
    }

    /// Checks if a button went down this frame.
    #[inline]
    #[must_use]
    pub const fn is_pressed(&self, button: Button) -> bool {
        self.pressed & button.bit() != 0
    }

    /// Checks if a button went up this frame.
    #[inline]
    #[must_use]
    pub const fn is_released(&self, button: Button) -> bool {
        self.released & button.bit() != 0
    }

    /// Returns the held direction as a unit-ish vector.
    ///
    /// Diagonals are normalized so two held directions cover the same
    /// distance per frame as one.
    #[must_use]
    pub fn direction_vector(&self) -> [f32; 2] {
        let mut direction = [0.0_f32, 0.0_f32];
        if self.is_down(Button::Down) {
            direction[1] += 1.0;
        }
        if self.is_down(Button::Up) {
            direction[1] -= 1.0;
        }
        if self.is_down(Button::Right) {
            direction[0] += 1.0;
        }
        if self.is_down(Button::Left) {
            direction[0] -= 1.0;
        }
        if direction[0] != 0.0 && direction[1] != 0.0 {
            direction[0] *= DIAGONAL_SCALE;
            direction[1] *= DIAGONAL_SCALE;
        }
        direction
    }
}

/// Source that replays a fixed per-frame script of button bits.
///
/// Holds the last frame's bits once the script runs out. Used by tests and
/// the headless demo.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    frames: Vec<u8>,
    cursor: usize,
}

impl ScriptedInput {
    /// Creates a script from per-frame packed button bits.
    #[must_use]
    pub fn new(frames: Vec<u8>) -> Self {
        Self { frames, cursor: 0 }
    }

    /// Convenience: a script that holds one button forever.
    #[must_use]
    pub fn holding(button: Button) -> Self {
        Self::new(vec![button.bit()])
    }
}

impl InputSource for ScriptedInput {
    fn button_bits(&mut self) -> u8 {
        let bits = self
            .frames
            .get(self.cursor)
            .or_else(|| self.frames.last())
            .copied()
            .unwrap_or(0);
        if self.cursor < self.frames.len() {
            self.cursor += 1;
        }
        bits
    }
}
