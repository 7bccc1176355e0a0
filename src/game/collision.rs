//! Collision Detection
//!
//! Deterministic AABB collision checks for player/bot contact and for
//! board power-up pickups.

use tracing::debug;

use crate::core::fixed::{Fixed, POINTS_PER_STOMP};
use crate::game::events::{GameEvent, GrantSource};
use crate::game::physics::bounce;
use crate::game::power_up::{collect_power_up, grant_power_up};
use crate::game::state::{Entity, EntityId, PowerUp, SimulationState};

/// How the player touched a bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactKind {
    /// Player's bottom edge within tolerance of the bot's top edge
    Stomp,
    /// Side contact or hit from below
    Side,
}

/// Result of a player-vs-bot collision.
#[derive(Debug, PartialEq, Eq)]
pub struct BotCollision {
    /// The bot that was touched
    pub bot: EntityId,
    /// Contact geometry
    pub kind: ContactKind,
}

/// Check collision between the player and one bot.
///
/// Returns None if they don't overlap or if either side is invincible.
pub fn check_bot_collision(player: &Entity, bot: &Entity, stomp_tolerance: Fixed) -> Option<ContactKind> {
    if !player.bounds().overlaps(&bot.bounds()) {
        return None;
    }

    if player.is_invincible || bot.is_invincible {
        return None;
    }

    if player.position.y >= bot.bounds().top() - stomp_tolerance {
        Some(ContactKind::Stomp)
    } else {
        Some(ContactKind::Side)
    }
}

/// Check the player against every bot, in bot order.
pub fn check_all_bot_collisions(state: &SimulationState) -> Vec<BotCollision> {
    let tolerance = state.sim.bots.stomp_tolerance;

    state
        .bots
        .iter()
        .filter_map(|bot| {
            check_bot_collision(&state.player, bot, tolerance)
                .map(|kind| BotCollision { bot: bot.id, kind })
        })
        .collect()
}

/// Resolve all player/bot contacts for this tick.
///
/// A stomp awards points, grants a power-up if the player's slot is empty
/// and bounces the bot. Side contact changes nothing.
pub fn resolve_bot_collisions(state: &mut SimulationState) {
    let bounce_velocity = state.sim.physics.jump_force / 2;

    for collision in check_all_bot_collisions(state) {
        match collision.kind {
            ContactKind::Stomp => {
                state.points = state.points.saturating_add(POINTS_PER_STOMP);
                state.push_event(GameEvent::bot_stomped(
                    state.tick,
                    collision.bot,
                    POINTS_PER_STOMP,
                    state.points,
                ));

                if !state.player.has_power_up() {
                    grant_power_up(state, EntityId::Player, GrantSource::Stomp);
                }

                if let Some(bot) = state.entity_mut(collision.bot) {
                    bounce(bot, bounce_velocity);
                }
            }
            ContactKind::Side => {
                debug!(tick = state.tick, bot = %collision.bot, "collision with bot");
                state.push_event(GameEvent::bot_contact(state.tick, collision.bot));
            }
        }
    }
}

/// Check if an entity can take a board power-up.
#[inline]
pub fn check_power_up_pickup(entity: &Entity, power_up: &PowerUp) -> bool {
    !entity.has_power_up() && entity.bounds().overlaps(&power_up.bounds())
}

/// Resolve board pickups: player first, then bots; items in id order.
///
/// Each entity takes the first overlapping item, and an item can only be
/// taken once.
pub fn resolve_pickups(state: &mut SimulationState) {
    for entity_id in state.entity_ids() {
        let Some(entity) = state.entity(entity_id) else {
            continue;
        };

        let target = state
            .power_ups
            .values()
            .find(|power_up| check_power_up_pickup(entity, power_up))
            .map(|power_up| power_up.id);

        if let Some(power_up_id) = target {
            if let Some(event) = collect_power_up(state, entity_id, power_up_id) {
                state.push_event(event);
            }
        }
    }
}
