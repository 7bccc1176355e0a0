//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the board simulation.
//! All gameplay arithmetic is integer-only; floats only appear when a
//! snapshot is projected for a renderer.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 units                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The 600×400 board, every speed multiplier (×1.5) and the bot bounce
//! (7.5) are exactly representable.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

// =============================================================================
// BOARD CONSTANTS (All as integer literals - NO float conversion!)
// =============================================================================

/// Board width: 600 units
pub const BOARD_WIDTH: Fixed = 600 * FIXED_ONE;

/// Board height: 400 units
pub const BOARD_HEIGHT: Fixed = 400 * FIXED_ONE;

/// Gravity: 1 unit/tick² subtracted from vertical velocity each tick
pub const GRAVITY: Fixed = FIXED_ONE;

/// Jump force: initial upward velocity of 15 units/tick
pub const JUMP_FORCE: Fixed = 15 * FIXED_ONE;

/// Player and bot width: 30 units
pub const ENTITY_WIDTH: Fixed = 30 * FIXED_ONE;

/// Player and bot height: 40 units
pub const ENTITY_HEIGHT: Fixed = 40 * FIXED_ONE;

/// Player base horizontal speed: 5 units/tick
pub const PLAYER_BASE_SPEED: Fixed = 5 * FIXED_ONE;

/// Power-up side length: 30 units
pub const POWER_UP_SIZE: Fixed = 30 * FIXED_ONE;

/// Speed boost multiplier: 1.5 = 98304
pub const SPEED_BOOST_MULT: Fixed = 98304;

/// Stomp tolerance between player bottom and bot top: 5 units
pub const STOMP_TOLERANCE: Fixed = 5 * FIXED_ONE;

/// Horizontal distance under which a bot may chase the player: 50 units
pub const BOT_CHASE_RANGE: Fixed = 50 * FIXED_ONE;

/// Points awarded for landing on a bot
pub const POINTS_PER_STOMP: u32 = 10;

/// Points awarded when the player uses Extra Points
pub const PLAYER_EXTRA_POINTS: u32 = 50;

/// Points awarded each time a bot applies Extra Points
pub const BOT_EXTRA_POINTS: u32 = 25;

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// # Warning
/// Only use at compile-time or initialization. NEVER in tick loop.
///
/// # Example
/// ```
/// use ledge_runner::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert an integer number of board units to fixed-point.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

/// Integer part of a fixed-point number (floor).
#[inline]
pub const fn floor_int(f: Fixed) -> i32 {
    f >> FIXED_SCALE
}

/// Convert fixed-point to float for display/rendering.
///
/// # Warning
/// Only use for visual output. NEVER use result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Multiply two fixed-point numbers, saturating at the i32 range.
///
/// Used for speed multipliers, which a bot can stack every tick.
#[inline]
pub fn fixed_mul_sat(a: Fixed, b: Fixed) -> Fixed {
    let wide = ((a as i64) * (b as i64)) >> FIXED_SCALE;
    wide.clamp(Fixed::MIN as i64, Fixed::MAX as i64) as Fixed
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 { x.wrapping_neg() } else { x }
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    value.max(min).min(max)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(FIXED_HALF, 32768);
        assert_eq!(FIXED_SCALE, 16);
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.0), FIXED_ONE);
        assert_eq!(to_fixed(0.5), FIXED_HALF);
        assert_eq!(to_fixed(-1.0), -FIXED_ONE);
        assert_eq!(to_fixed(7.5), 491520);
    }

    #[test]
    fn test_board_constants() {
        assert_eq!(BOARD_WIDTH, from_int(600));
        assert_eq!(BOARD_HEIGHT, from_int(400));
        assert_eq!(SPEED_BOOST_MULT, to_fixed(1.5));
        assert_eq!(JUMP_FORCE / 2, to_fixed(7.5));
    }

    #[test]
    fn test_fixed_mul_saturates() {
        let huge = Fixed::MAX / 2;
        assert_eq!(fixed_mul_sat(huge, to_fixed(4.0)), Fixed::MAX);
        assert_eq!(fixed_mul_sat(-huge, to_fixed(4.0)), Fixed::MIN);
        assert_eq!(fixed_mul_sat(to_fixed(2.0), SPEED_BOOST_MULT), to_fixed(3.0));
        assert_eq!(fixed_mul_sat(PLAYER_BASE_SPEED, SPEED_BOOST_MULT), to_fixed(7.5));
        assert_eq!(fixed_mul_sat(to_fixed(-2.0), to_fixed(3.0)), to_fixed(-6.0));
    }

    #[test]
    fn test_abs_and_clamp() {
        assert_eq!(fixed_abs(from_int(-3)), from_int(3));
        assert_eq!(fixed_clamp(from_int(-1), 0, from_int(570)), 0);
        assert_eq!(fixed_clamp(from_int(600), 0, from_int(570)), from_int(570));
    }

    #[test]
    fn test_floor_int() {
        assert_eq!(floor_int(to_fixed(129.9)), 129);
        assert_eq!(floor_int(from_int(100)), 100);
        assert_eq!(floor_int(0), 0);
    }
}
