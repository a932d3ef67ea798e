//! Input Capture and Normalization
//!
//! Handles player input with deterministic normalization.
//! Uses lookup table (MOVE_LUT) for exact i8 to Fixed conversion.

use serde::{Deserialize, Serialize};

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;

// =============================================================================
// MOVE LOOKUP TABLE (Critical for Determinism)
// =============================================================================

/// Lookup table for converting i8 move input to Fixed.
///
/// Converting i8 [-127..+127] to Fixed [-1.0..+1.0] requires
/// `value * 65536 / 127`, which is not exact in floating point, so all 256
/// possible values are precomputed with floor division.
///
/// Index 128 (-128 as i8) maps to 0 and represents "no input".
pub static MOVE_LUT: [Fixed; 256] = {
    let mut lut = [0i32; 256];
    let mut i = 0i32;
    while i < 256 {
        // Treat as signed: 0..127 = positive, 128..255 = negative (-128..-1)
        let signed = if i < 128 { i } else { i - 256 };

        // -128 is reserved for "no input" -> map to 0
        if signed == -128 {
            lut[i as usize] = 0;
        } else {
            lut[i as usize] = (signed * 65536) / 127;
        }
        i += 1;
    }
    lut
};

/// Convert i8 move input to Fixed using the lookup table.
#[inline]
pub fn move_to_fixed(input: i8) -> Fixed {
    MOVE_LUT[(input as u8) as usize]
}

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Raw input state for a single tick.
///
/// This is the minimal input that affects session state. No tick field;
/// the tick is stored separately where ordering matters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct InputFrame {
    /// Movement X direction: -127 (left) to +127 (right).
    /// -128 = no input.
    pub move_x: i8,

    /// Movement Y direction: -127 (up) to +127 (down).
    /// -128 = no input.
    pub move_y: i8,

    /// Action flags (packed bits):
    /// - Bit 0: Travel pressed this tick (edge, not held)
    /// - Bit 1: Run held
    /// - Bit 2-7: Reserved
    pub flags: u8,
}

impl InputFrame {
    /// Size in bytes
    pub const SIZE: usize = 3;

    /// Special value indicating no input
    pub const NO_INPUT: i8 = -128;

    /// Travel flag bit
    pub const FLAG_TRAVEL: u8 = 0x01;

    /// Run flag bit
    pub const FLAG_RUN: u8 = 0x02;

    /// Create a new empty input frame.
    pub const fn new() -> Self {
        Self {
            move_x: Self::NO_INPUT,
            move_y: Self::NO_INPUT,
            flags: 0,
        }
    }

    /// Create input with movement direction.
    pub const fn with_movement(move_x: i8, move_y: i8) -> Self {
        Self {
            move_x,
            move_y,
            flags: 0,
        }
    }

    /// Create input with only the travel flag set.
    pub const fn travel() -> Self {
        Self {
            move_x: Self::NO_INPUT,
            move_y: Self::NO_INPUT,
            flags: Self::FLAG_TRAVEL,
        }
    }

    /// Get movement as a normalized FixedVec2 via MOVE_LUT.
    #[inline]
    pub fn move_direction(&self) -> FixedVec2 {
        FixedVec2 {
            x: move_to_fixed(self.move_x),
            y: move_to_fixed(self.move_y),
        }
    }

    /// Was travel pressed this tick?
    #[inline]
    pub fn travel_pressed(&self) -> bool {
        self.flags & Self::FLAG_TRAVEL != 0
    }

    /// Is the run modifier held?
    #[inline]
    pub fn run_held(&self) -> bool {
        self.flags & Self::FLAG_RUN != 0
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.move_x == Self::NO_INPUT && self.move_y == Self::NO_INPUT && self.flags == 0
    }

    /// Check if input has any movement.
    #[inline]
    pub fn has_movement(&self) -> bool {
        self.move_x != Self::NO_INPUT || self.move_y != Self::NO_INPUT
    }

    /// Set the travel flag.
    #[inline]
    pub fn set_travel(&mut self, pressed: bool) {
        if pressed {
            self.flags |= Self::FLAG_TRAVEL;
        } else {
            self.flags &= !Self::FLAG_TRAVEL;
        }
    }

    /// Set the run flag.
    #[inline]
    pub fn set_run(&mut self, held: bool) {
        if held {
            self.flags |= Self::FLAG_RUN;
        } else {
            self.flags &= !Self::FLAG_RUN;
        }
    }
}

/// Input keyed by the tick it began at, for recordings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u64,
    /// The new input state
    pub frame: InputFrame,
}

impl InputDelta {
    /// Create new delta entry.
    pub fn new(tick: u64, frame: InputFrame) -> Self {
        Self { tick, frame }
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Complete input recording for one session, delta-compressed.
///
/// Only stores ticks where the input changed, which keeps recordings small.
/// Replaying a recording against the same level and seed reproduces the
/// session exactly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputRecording {
    /// Level this recording was captured on
    pub level_name: String,

    /// RNG seed used for the session
    pub seed: u64,

    /// Starting tick (usually 0)
    pub start_tick: u64,

    /// Last recorded tick
    pub end_tick: u64,

    deltas: Vec<InputDelta>,

    /// Last recorded input (for delta comparison)
    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecording {
    /// Create a new recording for a session.
    pub fn new(level_name: impl Into<String>, seed: u64) -> Self {
        Self {
            level_name: level_name.into(),
            seed,
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_frame: InputFrame::new(),
        }
    }

    /// Record input for a tick. Only stores if the input changed.
    pub fn record(&mut self, tick: u64, frame: InputFrame) {
        self.end_tick = tick;
        if frame != self.last_frame {
            self.deltas.push(InputDelta::new(tick, frame));
            self.last_frame = frame;
        }
    }

    /// Get input at a specific tick via binary search.
    pub fn input_at(&self, tick: u64) -> InputFrame {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// All deltas, in tick order.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Iterate all (tick, frame) pairs for replay.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current_frame: InputFrame::new(),
        }
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u64,
    delta_idx: usize,
    current_frame: InputFrame,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u64, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        while self.delta_idx < self.recording.deltas.len() {
            let delta = &self.recording.deltas[self.delta_idx];
            if delta.tick <= self.current_tick {
                self.current_frame = delta.frame;
                self.delta_idx += 1;
            } else {
                break;
            }
        }

        let result = (self.current_tick, self.current_frame);
        self.current_tick += 1;
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
