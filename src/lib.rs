//! # Ledge Runner
//!
//! Deterministic 2D platformer simulation: one player, AI bots, static
//! platforms and timed power-ups, driven by a fixed-tick loop that speeds
//! up as the score grows.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      LEDGE RUNNER                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic, constants  │
//! │  ├── vec2.rs     - Fixed-point vectors and AABBs             │
//! │  ├── rng.rs      - Xorshift128+ PRNG and exact chances       │
//! │  └── hash.rs     - State hashing for replay checks           │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── state.rs    - Entity store and session counters         │
//! │  ├── physics.rs  - Gravity and platform landing              │
//! │  ├── bot.rs      - Bot decision policy                       │
//! │  ├── power_up.rs - Spawn, pickup, effects, expiry            │
//! │  ├── collision.rs- Player/bot contact, pickups               │
//! │  ├── scheduler.rs- Tick period ramp                          │
//! │  ├── tick.rs     - One simulation step, replay               │
//! │  └── snapshot.rs - Render-ready per-tick view                │
//! │                                                              │
//! │  runtime/        - Real time (non-deterministic)             │
//! │  └── session.rs  - Session task, channels, restarts          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - Timed effects run on a simulated clock, not wall time
//! - All randomness from seeded Xorshift128+
//!
//! Given the same seed and input sequence, two runs end in the same
//! state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod runtime;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::vec2::{Aabb, FixedVec2};
pub use core::rng::{Chance, DeterministicRng};
pub use game::config::{BotDifficulty, SessionConfig, SimConfig};
pub use game::input::{InputFrame, InputRecording};
pub use game::state::{EntityId, PowerUpKind, SimulationState};
pub use game::snapshot::Snapshot;
pub use runtime::session::{spawn_session, SessionHandle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
