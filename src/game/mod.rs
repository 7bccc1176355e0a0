//! Game Logic Module
//!
//! All game simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `config`: Session settings and simulation tuning
//! - `input`: Normalized per-tick input and recordings
//! - `state`: Entity store and session counters
//! - `physics`: Gravity, ground and platform landing
//! - `bot`: Bot horizontal decision policy
//! - `power_up`: Spawn, pickup, effects and expiry
//! - `collision`: Player/bot contact and board pickups
//! - `scheduler`: Tick period ramp
//! - `tick`: One simulation step, and replay
//! - `snapshot`: Render-ready per-tick view
//! - `events`: Game events for logging and replay checks

pub mod config;
pub mod input;
pub mod state;
pub mod physics;
pub mod bot;
pub mod power_up;
pub mod collision;
pub mod scheduler;
pub mod tick;
pub mod snapshot;
pub mod events;

// Re-export key types
pub use config::{BotDifficulty, ConfigError, SessionConfig, SimConfig};
pub use input::{InputFrame, InputRecording, MOVE_LUT};
pub use state::{Entity, EntityId, Platform, PowerUp, PowerUpKind, SimulationState};
pub use tick::{tick, replay_session, TickResult};
pub use snapshot::Snapshot;
pub use events::{GameEvent, GameEventData};
