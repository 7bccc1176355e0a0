//! Input Normalization
//!
//! The core never sees devices. It consumes an already-normalized
//! `InputFrame` per tick: a horizontal axis and two action flags.
//! Uses lookup table (MOVE_LUT) for exact i8 to Fixed conversion.

use serde::{Serialize, Deserialize};
use crate::core::fixed::{Fixed, FIXED_HALF};

// =============================================================================
// MOVE LOOKUP TABLE
// =============================================================================

/// Lookup table for converting i8 axis input to Fixed.
///
/// Converting i8 [-127..+127] to Fixed [-1.0..+1.0] is
/// `(value * 65536) / 127`, which is not an integer multiple, so all
/// 256 values are precomputed.
///
/// Index 128 (-128 as i8) = 0 (represents "no input" / stick released)
pub static MOVE_LUT: [Fixed; 256] = {
    let mut lut = [0i32; 256];
    let mut i = 0i32;
    while i < 256 {
        // Treat as signed: 0..127 = positive, 128..255 = negative (-128..-1)
        let signed = if i < 128 { i } else { i - 256 };

        if signed == -128 {
            lut[i as usize] = 0;
        } else {
            lut[i as usize] = (signed * 65536) / 127;
        }
        i += 1;
    }
    lut
};

/// Convert i8 axis input to Fixed using lookup table.
#[inline]
pub fn move_to_fixed(input: i8) -> Fixed {
    MOVE_LUT[(input as u8) as usize]
}

/// Axis magnitude that must be exceeded before the player moves.
pub const AXIS_DEAD_ZONE: Fixed = FIXED_HALF;

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Normalized input for a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Horizontal axis: -127 (left) to +127 (right)
    /// -128 = no input
    pub move_x: i8,

    /// Action flags (packed bits):
    /// - Bit 0: Jump requested
    /// - Bit 1: Use held power-up
    pub flags: u8,
}

impl Default for InputFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl InputFrame {
    /// Special value indicating no input
    pub const NO_INPUT: i8 = -128;

    /// Jump flag bit
    pub const FLAG_JUMP: u8 = 0x01;

    /// Use power-up flag bit
    pub const FLAG_USE_POWER_UP: u8 = 0x02;

    /// Create an idle input frame.
    pub const fn new() -> Self {
        Self {
            move_x: Self::NO_INPUT,
            flags: 0,
        }
    }

    /// Create input with a horizontal axis value.
    pub const fn with_axis(move_x: i8) -> Self {
        Self { move_x, flags: 0 }
    }

    /// Full-deflection left.
    pub const fn left() -> Self {
        Self::with_axis(-127)
    }

    /// Full-deflection right.
    pub const fn right() -> Self {
        Self::with_axis(127)
    }

    /// Builder: set the jump flag.
    pub const fn jumping(mut self) -> Self {
        self.flags |= Self::FLAG_JUMP;
        self
    }

    /// Builder: set the use-power-up flag.
    pub const fn using_power_up(mut self) -> Self {
        self.flags |= Self::FLAG_USE_POWER_UP;
        self
    }

    /// Horizontal axis in [-1, 1] as Fixed.
    #[inline]
    pub fn axis(&self) -> Fixed {
        move_to_fixed(self.move_x)
    }

    /// Discrete horizontal direction after the dead zone: -1, 0 or 1.
    #[inline]
    pub fn direction(&self) -> i32 {
        let axis = self.axis();
        if axis > AXIS_DEAD_ZONE {
            1
        } else if axis < -AXIS_DEAD_ZONE {
            -1
        } else {
            0
        }
    }

    /// Check if jump was requested this tick.
    #[inline]
    pub fn jump_requested(&self) -> bool {
        self.flags & Self::FLAG_JUMP != 0
    }

    /// Check if the held power-up should be used this tick.
    #[inline]
    pub fn use_power_up(&self) -> bool {
        self.flags & Self::FLAG_USE_POWER_UP != 0
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.move_x == Self::NO_INPUT && self.flags == 0
    }

    /// Set jump flag.
    #[inline]
    pub fn set_jump(&mut self, pressed: bool) {
        if pressed {
            self.flags |= Self::FLAG_JUMP;
        } else {
            self.flags &= !Self::FLAG_JUMP;
        }
    }

    /// Set use-power-up flag.
    #[inline]
    pub fn set_use_power_up(&mut self, pressed: bool) {
        if pressed {
            self.flags |= Self::FLAG_USE_POWER_UP;
        } else {
            self.flags &= !Self::FLAG_USE_POWER_UP;
        }
    }
}

/// Delta-compressed input entry: the frame in force from `tick` onward.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u64,
    /// The new input state
    pub frame: InputFrame,
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Input recording for one session, used for replay.
///
/// Only ticks where the input changed are stored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputRecording {
    /// Last tick recorded
    pub end_tick: u64,

    deltas: Vec<InputDelta>,

    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self {
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_frame: InputFrame::new(),
        }
    }

    /// Record input for a tick.
    ///
    /// Only stores if input changed from previous frame.
    pub fn record(&mut self, tick: u64, frame: InputFrame) {
        self.end_tick = tick;

        if frame != self.last_frame {
            self.deltas.push(InputDelta { tick, frame });
            self.last_frame = frame;
        }
    }

    /// Get input at a specific tick.
    pub fn get_input_at(&self, tick: u64) -> InputFrame {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);

        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Iterate over every tick from 1 through `end_tick` with its input.
    pub fn replay_iter(&self) -> impl Iterator<Item = (u64, InputFrame)> + '_ {
        (1..=self.end_tick).map(move |tick| (tick, self.get_input_at(tick)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
