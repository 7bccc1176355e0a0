//! Game Events
//!
//! Events generated during simulation for logging, replay checks and
//! the session runtime's subscribers.

use serde::{Serialize, Deserialize};
use crate::core::vec2::FixedVec2;
use crate::game::state::{EntityId, PowerUpKind, PowerUpPhase};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Timed effects ending
    Expiry = 0,
    /// Player/bot contact
    Collision = 1,
    /// Power-up lifecycle
    PowerUp = 2,
    /// Tick period changes
    Scheduler = 3,
    /// Lowest priority
    Other = 255,
}

/// Where a held power-up came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantSource {
    /// Reward for stomping a bot
    Stomp,
    /// Random per-tick grant to an empty-handed bot
    Random,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A power-up appeared on a platform
    PowerUpSpawned {
        power_up_id: u32,
        kind: PowerUpKind,
        position: FixedVec2,
    },

    /// A board power-up moved into an entity's held slot
    PowerUpPickedUp {
        entity: EntityId,
        power_up_id: u32,
        kind: PowerUpKind,
    },

    /// A power-up was placed directly in an entity's held slot
    PowerUpGranted {
        entity: EntityId,
        power_up_id: u32,
        kind: PowerUpKind,
        source: GrantSource,
    },

    /// A held power-up's effect was applied
    PowerUpApplied {
        entity: EntityId,
        power_up_id: u32,
        kind: PowerUpKind,
        points: u32,
    },

    /// An instant power-up was used up
    PowerUpConsumed {
        entity: EntityId,
        power_up_id: u32,
        kind: PowerUpKind,
    },

    /// A timed effect was reverted
    EffectExpired {
        entity: EntityId,
        power_up_id: u32,
        kind: PowerUpKind,
    },

    /// The player landed on a bot
    BotStomped {
        bot: EntityId,
        points: u32,
        new_points: u32,
    },

    /// The player touched a bot from the side or below
    BotContact {
        bot: EntityId,
    },

    /// The tick period shrank (or was re-armed at the floor)
    SpeedIncreased {
        period_ms: u64,
    },
}

impl GameEventData {
    /// Lifecycle phase a power-up entered, for power-up events.
    pub fn power_up_phase(&self) -> Option<PowerUpPhase> {
        match self {
            GameEventData::PowerUpSpawned { .. } => Some(PowerUpPhase::Spawned),
            GameEventData::PowerUpPickedUp { .. } | GameEventData::PowerUpGranted { .. } => {
                Some(PowerUpPhase::PickedUp)
            }
            GameEventData::PowerUpApplied { .. } => Some(PowerUpPhase::Applied),
            GameEventData::EffectExpired { .. } => Some(PowerUpPhase::Expired),
            GameEventData::PowerUpConsumed { .. } => Some(PowerUpPhase::Consumed),
            GameEventData::BotStomped { .. }
            | GameEventData::BotContact { .. }
            | GameEventData::SpeedIncreased { .. } => None,
        }
    }
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Processing priority
    pub priority: EventPriority,

    /// Entity involved (for tie-breaking)
    pub entity: Option<EntityId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, priority: EventPriority, data: GameEventData) -> Self {
        let entity = match &data {
            GameEventData::PowerUpPickedUp { entity, .. }
            | GameEventData::PowerUpGranted { entity, .. }
            | GameEventData::PowerUpApplied { entity, .. }
            | GameEventData::PowerUpConsumed { entity, .. }
            | GameEventData::EffectExpired { entity, .. } => Some(*entity),
            GameEventData::BotStomped { bot, .. } | GameEventData::BotContact { bot } => Some(*bot),
            GameEventData::PowerUpSpawned { .. } | GameEventData::SpeedIncreased { .. } => None,
        };

        Self {
            tick,
            priority,
            entity,
            data,
        }
    }

    /// Create power-up spawned event.
    pub fn power_up_spawned(tick: u64, power_up_id: u32, kind: PowerUpKind, position: FixedVec2) -> Self {
        Self::new(
            tick,
            EventPriority::PowerUp,
            GameEventData::PowerUpSpawned { power_up_id, kind, position },
        )
    }

    /// Create power-up picked up event.
    pub fn power_up_picked_up(tick: u64, entity: EntityId, power_up_id: u32, kind: PowerUpKind) -> Self {
        Self::new(
            tick,
            EventPriority::PowerUp,
            GameEventData::PowerUpPickedUp { entity, power_up_id, kind },
        )
    }

    /// Create power-up granted event.
    pub fn power_up_granted(
        tick: u64,
        entity: EntityId,
        power_up_id: u32,
        kind: PowerUpKind,
        source: GrantSource,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::PowerUp,
            GameEventData::PowerUpGranted { entity, power_up_id, kind, source },
        )
    }

    /// Create power-up applied event.
    pub fn power_up_applied(
        tick: u64,
        entity: EntityId,
        power_up_id: u32,
        kind: PowerUpKind,
        points: u32,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::PowerUp,
            GameEventData::PowerUpApplied { entity, power_up_id, kind, points },
        )
    }

    /// Create power-up consumed event.
    pub fn power_up_consumed(tick: u64, entity: EntityId, power_up_id: u32, kind: PowerUpKind) -> Self {
        Self::new(
            tick,
            EventPriority::PowerUp,
            GameEventData::PowerUpConsumed { entity, power_up_id, kind },
        )
    }

    /// Create effect expired event.
    pub fn effect_expired(tick: u64, entity: EntityId, power_up_id: u32, kind: PowerUpKind) -> Self {
        Self::new(
            tick,
            EventPriority::Expiry,
            GameEventData::EffectExpired { entity, power_up_id, kind },
        )
    }

    /// Create bot stomped event.
    pub fn bot_stomped(tick: u64, bot: EntityId, points: u32, new_points: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Collision,
            GameEventData::BotStomped { bot, points, new_points },
        )
    }

    /// Create bot contact event.
    pub fn bot_contact(tick: u64, bot: EntityId) -> Self {
        Self::new(tick, EventPriority::Collision, GameEventData::BotContact { bot })
    }

    /// Create speed increased event.
    pub fn speed_increased(tick: u64, period_ms: u64) -> Self {
        Self::new(
            tick,
            EventPriority::Scheduler,
            GameEventData::SpeedIncreased { period_ms },
        )
    }
}

// Equality and ordering look at the (tick, priority, entity) key only, so
// a stable sort keeps emission order within one key.
impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.entity == other.entity
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then entity
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.entity.cmp(&other.entity))
    }
}
