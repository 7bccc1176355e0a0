//! Core deterministic primitives.
//!
//! Fixed-point numbers, board geometry, the seeded RNG and state hashing.
//! Nothing in here knows about players, bots or power-ups.

pub mod fixed;
pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec2::{Aabb, FixedVec2};
pub use rng::{Chance, DeterministicRng};
pub use hash::{compute_state_hash, hash_hex, StateHash};
