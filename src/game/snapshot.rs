//! Per-Tick Snapshots
//!
//! Immutable, render-ready projection of `SimulationState`. Renderers and
//! scoreboards only ever see these; they never touch engine internals.
//! Coordinates are converted to floats here and nowhere else.

use serde::{Serialize, Deserialize};

use crate::core::fixed::to_float;
use crate::game::state::{Entity, EntityId, Platform, PowerUp, PowerUpKind, SimulationState};

/// Opacity of an invincible entity.
pub const INVINCIBLE_OPACITY: f32 = 0.5;

/// One moving entity as a renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    /// Player or bot index
    pub id: EntityId,
    /// Bottom-left x in board units
    pub x: f32,
    /// Bottom-left y in board units
    pub y: f32,
    /// Width in board units
    pub width: f32,
    /// Height in board units
    pub height: f32,
    /// 1.0 normally, 0.5 while invincible
    pub opacity: f32,
    /// Kind of the held power-up, if any
    pub held: Option<PowerUpKind>,
}

impl EntityView {
    /// Project an entity.
    pub fn from_entity(entity: &Entity) -> Self {
        let (x, y) = entity.position.to_floats();
        Self {
            id: entity.id,
            x,
            y,
            width: to_float(entity.width),
            height: to_float(entity.height),
            opacity: if entity.is_invincible { INVINCIBLE_OPACITY } else { 1.0 },
            held: entity.held.as_ref().map(|p| p.kind),
        }
    }
}

/// A board power-up as a renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUpView {
    /// Power-up id
    pub id: u32,
    /// Effect kind
    pub kind: PowerUpKind,
    /// Bottom-left x
    pub x: f32,
    /// Bottom-left y
    pub y: f32,
    /// Side length
    pub size: f32,
}

impl From<&PowerUp> for PowerUpView {
    fn from(power_up: &PowerUp) -> Self {
        let (x, y) = power_up.position.to_floats();
        Self {
            id: power_up.id,
            kind: power_up.kind,
            x,
            y,
            size: to_float(power_up.size),
        }
    }
}

/// A platform rectangle in board units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformView {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl From<&Platform> for PlatformView {
    fn from(platform: &Platform) -> Self {
        let (x, y) = platform.bounds.origin.to_floats();
        Self {
            x,
            y,
            width: to_float(platform.bounds.width),
            height: to_float(platform.bounds.height),
        }
    }
}

/// Everything emitted after a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Session epoch; bumped on every restart
    pub epoch: u64,
    /// Tick that produced this snapshot
    pub tick: u64,
    /// Simulated clock in milliseconds
    pub clock_ms: u64,
    /// Tick period in force for the next tick
    pub period_ms: u64,
    /// Tick counter
    pub score: u64,
    /// Global points
    pub points: u32,
    /// Cosmetic player color
    pub player_color: String,
    /// The player
    pub player: EntityView,
    /// Bots in creation order
    pub bots: Vec<EntityView>,
    /// Board power-ups by ascending id
    pub power_ups: Vec<PowerUpView>,
    /// Platforms in layout order
    pub platforms: Vec<PlatformView>,
    /// Ordered `(label, score)` rows
    pub scoreboard: Vec<(String, u32)>,
}

impl Snapshot {
    /// Capture the current state.
    pub fn capture(state: &SimulationState, epoch: u64) -> Self {
        Self {
            epoch,
            tick: state.tick,
            clock_ms: state.clock_ms,
            period_ms: state.scheduler.period_ms(),
            score: state.score,
            points: state.points,
            player_color: state.session.player_color.clone(),
            player: EntityView::from_entity(&state.player),
            bots: state.bots.iter().map(EntityView::from_entity).collect(),
            power_ups: state.power_ups.values().map(PowerUpView::from).collect(),
            platforms: state.platforms.iter().map(PlatformView::from).collect(),
            scoreboard: state.scoreboard(),
        }
    }
}
