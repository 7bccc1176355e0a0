//! Session and Simulation Configuration
//!
//! `SessionConfig` is chosen once per session (menu settings).
//! `SimConfig` carries the tuning constants of the simulation itself.

use std::path::Path;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{
    Fixed, from_int,
    GRAVITY, JUMP_FORCE, PLAYER_BASE_SPEED, SPEED_BOOST_MULT,
    STOMP_TOLERANCE, BOT_CHASE_RANGE,
};
use crate::core::rng::Chance;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Difficulty string not one of easy / medium / hard.
    #[error("unknown bot difficulty: {0}")]
    UnknownDifficulty(String),

    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for `SessionConfig`.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// More bots than fit in the spawn row.
    #[error("bot_count {count} exceeds the maximum of {max}")]
    TooManyBots {
        /// Requested bot count
        count: usize,
        /// Largest accepted bot count
        max: usize,
    },
}

// =============================================================================
// BOT DIFFICULTY
// =============================================================================

/// Bot difficulty, which only sets the bots' base speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum BotDifficulty {
    /// Speed 1
    Easy,
    /// Speed 2
    #[default]
    Medium,
    /// Speed 3
    Hard,
}

impl BotDifficulty {
    /// Base horizontal speed for bots at this difficulty.
    pub fn bot_speed(self) -> Fixed {
        match self {
            BotDifficulty::Easy => from_int(1),
            BotDifficulty::Medium => from_int(2),
            BotDifficulty::Hard => from_int(3),
        }
    }
}

impl FromStr for BotDifficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(BotDifficulty::Easy),
            "medium" => Ok(BotDifficulty::Medium),
            "hard" => Ok(BotDifficulty::Hard),
            other => Err(ConfigError::UnknownDifficulty(other.to_string())),
        }
    }
}

// =============================================================================
// SESSION CONFIG
// =============================================================================

/// Most bots a session can hold. Bot `i` spawns at x = 100 + 50·i, and
/// the last spawn (x = 550) must leave room for a 30-wide bot.
pub const MAX_BOTS: usize = 10;

/// Settings fixed at session start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bot difficulty.
    pub bot_difficulty: BotDifficulty,
    /// Player color (cosmetic, forwarded to snapshots only).
    pub player_color: String,
    /// Number of bots on the board.
    pub bot_count: usize,
    /// Seed for the deterministic RNG.
    pub rng_seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bot_difficulty: BotDifficulty::Medium,
            player_color: "blue".to_string(),
            bot_count: 3,
            rng_seed: 12345,
        }
    }
}

impl SessionConfig {
    /// Load a session config from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a session config from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot constrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_count > MAX_BOTS {
            return Err(ConfigError::TooManyBots {
                count: self.bot_count,
                max: MAX_BOTS,
            });
        }
        Ok(())
    }
}

// =============================================================================
// SIMULATION CONFIG
// =============================================================================

/// Physics tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Subtracted from vertical velocity every tick
    pub gravity: Fixed,
    /// Vertical velocity set by a jump
    pub jump_force: Fixed,
    /// Player base horizontal speed
    pub player_speed: Fixed,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_force: JUMP_FORCE,
            player_speed: PLAYER_BASE_SPEED,
        }
    }
}

/// Power-up tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpConfig {
    /// Per-tick chance of spawning a board power-up
    pub spawn_chance: Chance,
    /// Per-tick chance of granting a power-up to an empty-handed bot
    pub bot_grant_chance: Chance,
    /// Speed multiplier for SpeedBoost
    pub speed_multiplier: Fixed,
    /// Lifetime of SpeedBoost and Invincibility effects
    pub effect_duration_ms: u64,
    /// Delay before a bot's Extra Points slot is released
    pub bot_extra_points_release_ms: u64,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            spawn_chance: Chance::new(5, 1000),
            bot_grant_chance: Chance::new(1, 100),
            speed_multiplier: SPEED_BOOST_MULT,
            effect_duration_ms: 5000,
            bot_extra_points_release_ms: 1000,
        }
    }
}

/// Bot and collision tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Horizontal center distance under which a bot may chase
    pub chase_range: Fixed,
    /// Chance a nearby bot chases instead of wandering
    pub chase_chance: Chance,
    /// Chance a wandering bot steps right
    pub wander_right_chance: Chance,
    /// Tolerance for the landed-from-above test
    pub stomp_tolerance: Fixed,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            chase_range: BOT_CHASE_RANGE,
            chase_chance: Chance::HALF,
            wander_right_chance: Chance::HALF,
            stomp_tolerance: STOMP_TOLERANCE,
        }
    }
}

/// Tick scheduler tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Starting tick period
    pub initial_period_ms: u64,
    /// Period never drops below this
    pub min_period_ms: u64,
    /// Period reduction per ramp step
    pub step_ms: u64,
    /// Score interval between ramp steps
    pub ramp_every: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_period_ms: 100,
            min_period_ms: 50,
            step_ms: 5,
            ramp_every: 1000,
        }
    }
}

/// Full simulation tuning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Physics tuning
    pub physics: PhysicsConfig,
    /// Power-up tuning
    pub power_ups: PowerUpConfig,
    /// Bot tuning
    pub bots: BotConfig,
    /// Scheduler tuning
    pub scheduler: SchedulerConfig,
}
