//! Simulation State Definitions
//!
//! The entity store: player, bots, platforms and power-ups, plus the
//! session-wide counters. One `SimulationState` value is the whole world;
//! every engine operation takes it by `&mut` and nothing lives outside it.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::core::fixed::{
    Fixed, from_int, fixed_clamp,
    BOARD_WIDTH, BOARD_HEIGHT, ENTITY_WIDTH, ENTITY_HEIGHT, POWER_UP_SIZE,
};
use crate::core::vec2::{Aabb, FixedVec2};
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::game::config::{SessionConfig, SimConfig, MAX_BOTS};
use crate::game::events::GameEvent;
use crate::game::scheduler::TickScheduler;

// =============================================================================
// ENTITY ID
// =============================================================================

/// Identifies a moving entity.
///
/// Ordering is the evaluation order used everywhere: player first, then
/// bots by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityId {
    /// The human-controlled entity
    Player,
    /// An AI-controlled bot (0-based index)
    Bot(u8),
}

impl EntityId {
    /// Is this the player?
    #[inline]
    pub fn is_player(self) -> bool {
        matches!(self, EntityId::Player)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Player => write!(f, "player"),
            EntityId::Bot(i) => write!(f, "bot {}", i + 1),
        }
    }
}

// =============================================================================
// POWER-UPS
// =============================================================================

/// Kind of power-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PowerUpKind {
    /// Speed ×1.5 for 5 seconds
    SpeedBoost = 0,
    /// Ignore player/bot collisions for 5 seconds
    Invincibility = 1,
    /// Instant points
    ExtraPoints = 2,
}

impl PowerUpKind {
    /// All kinds, in index order.
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::SpeedBoost,
        PowerUpKind::Invincibility,
        PowerUpKind::ExtraPoints,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "Speed Boost",
            PowerUpKind::Invincibility => "Invincibility",
            PowerUpKind::ExtraPoints => "Extra Points",
        }
    }
}

/// Lifecycle phase of a power-up instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpPhase {
    /// On the board
    Spawned,
    /// In an entity's held slot
    PickedUp,
    /// Effect active, timer running
    Applied,
    /// Timed effect reverted
    Expired,
    /// Instant effect used up
    Consumed,
}

/// A power-up instance, either on the board or held.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    /// Unique id (monotonic counter)
    pub id: u32,
    /// Effect kind
    pub kind: PowerUpKind,
    /// Bottom-left corner on the board
    pub position: FixedVec2,
    /// Side length
    pub size: Fixed,
}

impl PowerUp {
    /// Create a power-up of the standard size.
    pub fn new(id: u32, kind: PowerUpKind, position: FixedVec2) -> Self {
        Self {
            id,
            kind,
            position,
            size: POWER_UP_SIZE,
        }
    }

    /// Bounding box.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.size, self.size)
    }
}

/// What to undo when a timed effect expires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reversion {
    /// Set speed back to the captured pre-boost value
    RestoreSpeed(Fixed),
    /// Clear the invincible flag
    EndInvincibility,
    /// Nothing to revert (delayed slot release only)
    None,
}

/// A pending deferred action stored on its entity.
///
/// Checked by the tick loop against the simulated clock, so it can never
/// outlive the state it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEffect {
    /// Power-up that caused the effect
    pub power_up_id: u32,
    /// Its kind
    pub kind: PowerUpKind,
    /// Simulated time at which the reversion runs
    pub expires_at_ms: u64,
    /// Undo action
    pub reversion: Reversion,
    /// Also empty the holder's slot when the reversion runs
    pub releases_held: bool,
}

// =============================================================================
// ENTITY
// =============================================================================

/// Player or bot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    /// Which entity this is
    pub id: EntityId,
    /// Bottom-left corner
    pub position: FixedVec2,
    /// Width
    pub width: Fixed,
    /// Height
    pub height: Fixed,
    /// Vertical velocity, positive is up
    pub velocity_y: Fixed,
    /// Airborne after a jump or bounce
    pub is_jumping: bool,
    /// Horizontal step per tick
    pub speed: Fixed,
    /// Collisions with the other side are ignored
    pub is_invincible: bool,
    /// At most one held power-up
    pub held: Option<PowerUp>,
    /// Pending reversions, in application order
    pub effects: Vec<TimedEffect>,
}

impl Entity {
    /// Create a resting entity of the standard size.
    pub fn new(id: EntityId, position: FixedVec2, speed: Fixed) -> Self {
        Self {
            id,
            position,
            width: ENTITY_WIDTH,
            height: ENTITY_HEIGHT,
            velocity_y: 0,
            is_jumping: false,
            speed,
            is_invincible: false,
            held: None,
            effects: Vec::new(),
        }
    }

    /// Bounding box.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.width, self.height)
    }

    /// Largest legal x.
    #[inline]
    pub fn max_x(&self) -> Fixed {
        BOARD_WIDTH - self.width
    }

    /// Largest legal y.
    #[inline]
    pub fn max_y(&self) -> Fixed {
        BOARD_HEIGHT - self.height
    }

    /// Move horizontally by `dx`, clamped to the board.
    pub fn step_x(&mut self, dx: Fixed) {
        let x = self.position.x.saturating_add(dx);
        self.position.x = fixed_clamp(x, 0, self.max_x());
    }

    /// Start a jump if resting. Returns true if the jump started.
    pub fn try_jump(&mut self, jump_force: Fixed) -> bool {
        if self.is_jumping {
            return false;
        }
        self.velocity_y = jump_force;
        self.is_jumping = true;
        true
    }

    /// Does this entity currently hold a power-up?
    #[inline]
    pub fn has_power_up(&self) -> bool {
        self.held.is_some()
    }

    /// Hash this entity's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        match self.id {
            EntityId::Player => hasher.update_u8(0xFF),
            EntityId::Bot(i) => hasher.update_u8(i),
        }
        hasher.update_aabb(&self.bounds());
        hasher.update_fixed(self.velocity_y);
        hasher.update_bool(self.is_jumping);
        hasher.update_fixed(self.speed);
        hasher.update_bool(self.is_invincible);
        match &self.held {
            Some(p) => {
                hasher.update_u32(p.id);
                hasher.update_u8(p.kind as u8);
            }
            None => hasher.update_u8(0xFF),
        }
        hasher.update_count(self.effects.len());
        for effect in &self.effects {
            hasher.update_u32(effect.power_up_id);
            hasher.update_u8(effect.kind as u8);
            hasher.update_u64(effect.expires_at_ms);
            hasher.update_bool(effect.releases_held);
        }
    }
}

// =============================================================================
// PLATFORMS
// =============================================================================

/// Immutable axis-aligned platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Platform rectangle
    pub bounds: Aabb,
}

impl Platform {
    /// Create from integer board units.
    pub const fn from_ints(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            bounds: Aabb::new(FixedVec2::from_ints(x, y), from_int(width), from_int(height)),
        }
    }

    /// Top surface height.
    #[inline]
    pub fn top(&self) -> Fixed {
        self.bounds.top()
    }
}

/// Default platform layout, in evaluation order.
pub const PLATFORM_LAYOUT: [Platform; 5] = [
    Platform::from_ints(0, 80, 200, 20),
    Platform::from_ints(250, 130, 150, 20),
    Platform::from_ints(450, 180, 100, 20),
    Platform::from_ints(50, 230, 180, 20),
    Platform::from_ints(350, 280, 120, 20),
];

/// Player spawn point.
pub const PLAYER_SPAWN: FixedVec2 = FixedVec2::from_ints(50, 0);

/// Spawn point of bot `index`.
pub fn bot_spawn(index: usize) -> FixedVec2 {
    FixedVec2::from_ints(100 + 50 * index as i32, 0)
}

// =============================================================================
// SIMULATION STATE
// =============================================================================

/// Complete state of one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationState {
    /// Ticks executed so far
    pub tick: u64,

    /// Simulated wall clock in milliseconds
    pub clock_ms: u64,

    /// Tick counter driving the speed ramp
    pub score: u64,

    /// Points shown on the scoreboard
    pub points: u32,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG state
    pub rng: DeterministicRng,

    /// Session settings
    pub session: SessionConfig,

    /// Simulation tuning
    pub sim: SimConfig,

    /// Tick period controller
    pub scheduler: TickScheduler,

    /// The player
    pub player: Entity,

    /// Bots, in creation order
    pub bots: Vec<Entity>,

    /// Platforms, in evaluation order
    pub platforms: Vec<Platform>,

    /// Board power-ups (BTreeMap for deterministic iteration)
    pub power_ups: BTreeMap<u32, PowerUp>,

    /// Next power-up ID (monotonic counter)
    pub next_power_up_id: u32,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl SimulationState {
    /// Start a fresh session: new player, bots and platforms.
    pub fn new(session: SessionConfig, sim: SimConfig) -> Self {
        let bot_speed = session.bot_difficulty.bot_speed();
        let bot_count = session.bot_count.min(MAX_BOTS);
        if bot_count < session.bot_count {
            warn!("bot_count {} capped at {}", session.bot_count, MAX_BOTS);
        }
        let bots = (0..bot_count)
            .map(|i| Entity::new(EntityId::Bot(i as u8), bot_spawn(i), bot_speed))
            .collect();

        Self {
            tick: 0,
            clock_ms: 0,
            score: 0,
            points: 0,
            rng_seed: session.rng_seed,
            rng: DeterministicRng::new(session.rng_seed),
            scheduler: TickScheduler::new(sim.scheduler),
            player: Entity::new(EntityId::Player, PLAYER_SPAWN, sim.physics.player_speed),
            bots,
            platforms: PLATFORM_LAYOUT.to_vec(),
            power_ups: BTreeMap::new(),
            next_power_up_id: 0,
            pending_events: Vec::new(),
            session,
            sim,
        }
    }

    /// Get an entity by ID.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        match id {
            EntityId::Player => Some(&self.player),
            EntityId::Bot(i) => self.bots.get(i as usize),
        }
    }

    /// Get an entity mutably by ID.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match id {
            EntityId::Player => Some(&mut self.player),
            EntityId::Bot(i) => self.bots.get_mut(i as usize),
        }
    }

    /// All entity IDs in evaluation order.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        std::iter::once(EntityId::Player)
            .chain((0..self.bots.len()).map(|i| EntityId::Bot(i as u8)))
            .collect()
    }

    /// Iterate over the player then bots.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        std::iter::once(&self.player).chain(self.bots.iter())
    }

    /// Allocate the next power-up id.
    pub fn allocate_power_up_id(&mut self) -> u32 {
        let id = self.next_power_up_id;
        self.next_power_up_id += 1;
        id
    }

    /// Put a new power-up on the board.
    pub fn spawn_power_up(&mut self, position: FixedVec2, kind: PowerUpKind) -> u32 {
        let id = self.allocate_power_up_id();
        self.power_ups.insert(id, PowerUp::new(id, kind, position));
        id
    }

    /// Ordered `(label, score)` pairs for the scoreboard.
    pub fn scoreboard(&self) -> Vec<(String, u32)> {
        let mut rows = Vec::with_capacity(1 + self.bots.len());
        rows.push(("Sigma (You)".to_string(), self.points));
        for (i, bot) in self.bots.iter().enumerate() {
            let score = crate::core::fixed::floor_int(bot.position.x) / 10;
            rows.push((format!("Bot {}", i + 1), score.max(0) as u32));
        }
        rows
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.clock_ms, self.rng_seed, |hasher| {
            hasher.update_u64(self.score);
            hasher.update_u32(self.points);
            hasher.update_u64(self.scheduler.period_ms());

            hasher.update_count(self.bots.len());
            for entity in self.entities() {
                entity.hash_into(hasher);
            }

            hasher.update_count(self.platforms.len());
            for platform in &self.platforms {
                hasher.update_aabb(&platform.bounds);
            }

            hasher.update_count(self.power_ups.len());
            for (id, power_up) in &self.power_ups {
                hasher.update_u32(*id);
                hasher.update_aabb(&power_up.bounds());
                hasher.update_u8(power_up.kind as u8);
            }

            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
