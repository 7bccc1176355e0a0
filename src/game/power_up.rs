//! Power-Up Spawning, Pickup, Effects and Expiry
//!
//! Lifecycle per instance: Spawned -> PickedUp -> Applied -> Expired | Consumed.
//!
//! Timed effects are `TimedEffect` records stored on the holder and checked
//! against the simulated clock at the start of every tick. A restart builds
//! a fresh `SimulationState`, so records from a previous session cannot
//! touch the new entities.

use tracing::debug;

use crate::core::fixed::{fixed_mul_sat, BOT_EXTRA_POINTS, PLAYER_EXTRA_POINTS, POWER_UP_SIZE};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::game::config::PowerUpConfig;
use crate::game::events::{GameEvent, GrantSource};
use crate::game::state::{
    Entity, EntityId, PowerUp, PowerUpKind, Reversion, SimulationState, TimedEffect,
};

/// Uniformly random power-up kind.
pub fn random_kind(rng: &mut DeterministicRng) -> PowerUpKind {
    let index = rng.next_int(PowerUpKind::ALL.len() as u32);
    PowerUpKind::ALL[index as usize]
}

// =============================================================================
// SPAWN
// =============================================================================

/// Per-tick spawn roll.
///
/// Draw order: chance roll, platform index, kind. Nothing is drawn when the
/// board has no platforms.
pub fn maybe_spawn_power_up(state: &mut SimulationState) -> Option<u32> {
    if state.platforms.is_empty() {
        return None;
    }

    if !state.rng.roll(state.sim.power_ups.spawn_chance) {
        return None;
    }

    let index = state.rng.choose_index(state.platforms.len())?;
    let kind = random_kind(&mut state.rng);

    let platform = state.platforms[index];
    let position = FixedVec2::new(
        platform.bounds.center_x() - POWER_UP_SIZE / 2,
        platform.top(),
    );

    let id = state.spawn_power_up(position, kind);
    debug!(tick = state.tick, id, kind = kind.name(), platform = index, "power-up spawned");
    state.push_event(GameEvent::power_up_spawned(state.tick, id, kind, position));
    Some(id)
}

// =============================================================================
// PICKUP AND GRANT
// =============================================================================

/// Move a board power-up into an entity's held slot.
///
/// Returns None if the entity already holds one or the item is gone.
pub fn collect_power_up(state: &mut SimulationState, entity_id: EntityId, power_up_id: u32) -> Option<GameEvent> {
    if state.entity(entity_id)?.has_power_up() {
        return None;
    }

    let power_up = state.power_ups.remove(&power_up_id)?;
    let kind = power_up.kind;

    let entity = state.entity_mut(entity_id)?;
    entity.held = Some(power_up);

    debug!(tick = state.tick, %entity_id, id = power_up_id, kind = kind.name(), "power-up picked up");
    Some(GameEvent::power_up_picked_up(state.tick, entity_id, power_up_id, kind))
}

/// Put a fresh random power-up straight into an empty held slot.
pub fn grant_power_up(state: &mut SimulationState, entity_id: EntityId, source: GrantSource) -> Option<u32> {
    let position = {
        let entity = state.entity(entity_id)?;
        if entity.has_power_up() {
            return None;
        }
        entity.position
    };

    let kind = random_kind(&mut state.rng);
    let id = state.allocate_power_up_id();
    let entity = state.entity_mut(entity_id)?;
    entity.held = Some(PowerUp::new(id, kind, position));

    debug!(tick = state.tick, %entity_id, id, kind = kind.name(), ?source, "power-up granted");
    state.push_event(GameEvent::power_up_granted(state.tick, entity_id, id, kind, source));
    Some(id)
}

// =============================================================================
// EFFECTS
// =============================================================================

/// Apply one power-up's effect to its holder and return the points earned.
///
/// Player and bot differ only for Extra Points: the player's slot is
/// cleared by the caller, a bot's slot is released by a delayed record.
pub fn apply_effect(
    entity: &mut Entity,
    power_up: &PowerUp,
    now_ms: u64,
    config: &PowerUpConfig,
) -> u32 {
    let is_bot = !entity.id.is_player();

    match power_up.kind {
        PowerUpKind::SpeedBoost => {
            let previous = entity.speed;
            entity.speed = fixed_mul_sat(entity.speed, config.speed_multiplier);
            entity.effects.push(TimedEffect {
                power_up_id: power_up.id,
                kind: power_up.kind,
                expires_at_ms: now_ms.saturating_add(config.effect_duration_ms),
                reversion: Reversion::RestoreSpeed(previous),
                releases_held: is_bot,
            });
            0
        }
        PowerUpKind::Invincibility => {
            entity.is_invincible = true;
            entity.effects.push(TimedEffect {
                power_up_id: power_up.id,
                kind: power_up.kind,
                expires_at_ms: now_ms.saturating_add(config.effect_duration_ms),
                reversion: Reversion::EndInvincibility,
                releases_held: is_bot,
            });
            0
        }
        PowerUpKind::ExtraPoints if is_bot => {
            entity.effects.push(TimedEffect {
                power_up_id: power_up.id,
                kind: power_up.kind,
                expires_at_ms: now_ms.saturating_add(config.bot_extra_points_release_ms),
                reversion: Reversion::None,
                releases_held: true,
            });
            BOT_EXTRA_POINTS
        }
        PowerUpKind::ExtraPoints => PLAYER_EXTRA_POINTS,
    }
}

/// Undo one expired record on its entity.
pub fn revert_effect(entity: &mut Entity, effect: &TimedEffect) {
    match effect.reversion {
        Reversion::RestoreSpeed(speed) => entity.speed = speed,
        Reversion::EndInvincibility => entity.is_invincible = false,
        Reversion::None => {}
    }

    // Unconditional: a slot refilled since the effect started is emptied too
    if effect.releases_held {
        entity.held = None;
    }
}

/// The player's explicit "use" trigger.
///
/// Empties the held slot and applies the effect. A no-op when nothing is
/// held. Returns the points earned.
pub fn use_power_up(state: &mut SimulationState) -> Option<u32> {
    let power_up = state.player.held.take()?;
    let points = apply_effect(&mut state.player, &power_up, state.clock_ms, &state.sim.power_ups);
    state.points = state.points.saturating_add(points);

    debug!(tick = state.tick, id = power_up.id, kind = power_up.kind.name(), points, "player used power-up");
    state.push_event(GameEvent::power_up_applied(
        state.tick,
        EntityId::Player,
        power_up.id,
        power_up.kind,
        points,
    ));
    if power_up.kind == PowerUpKind::ExtraPoints {
        state.push_event(GameEvent::power_up_consumed(
            state.tick,
            EntityId::Player,
            power_up.id,
            power_up.kind,
        ));
    }

    Some(points)
}

/// Per-tick bot step: random grant roll, then re-apply whatever is held.
///
/// The grant roll is drawn for every bot, holding or not.
pub fn process_bot_power_ups(state: &mut SimulationState) {
    for index in 0..state.bots.len() {
        let bot_id = EntityId::Bot(index as u8);

        let granted = state.rng.roll(state.sim.power_ups.bot_grant_chance);
        if granted && !state.bots[index].has_power_up() {
            grant_power_up(state, bot_id, GrantSource::Random);
        }

        let Some(power_up) = state.bots[index].held.clone() else {
            continue;
        };

        let points = apply_effect(&mut state.bots[index], &power_up, state.clock_ms, &state.sim.power_ups);
        state.points = state.points.saturating_add(points);

        debug!(tick = state.tick, %bot_id, id = power_up.id, kind = power_up.kind.name(), "bot applied power-up");
        state.push_event(GameEvent::power_up_applied(
            state.tick,
            bot_id,
            power_up.id,
            power_up.kind,
            points,
        ));
    }
}

// =============================================================================
// EXPIRY
// =============================================================================

/// Run every record whose deadline has passed on the simulated clock.
///
/// Records fire in deadline order, ties in application order. Returns the
/// number of records reverted.
pub fn expire_effects(state: &mut SimulationState) -> usize {
    let now = state.clock_ms;
    let tick = state.tick;
    let mut events = Vec::new();

    for entity in std::iter::once(&mut state.player).chain(state.bots.iter_mut()) {
        if entity.effects.iter().all(|e| e.expires_at_ms > now) {
            continue;
        }

        let (mut due, pending): (Vec<TimedEffect>, Vec<TimedEffect>) =
            std::mem::take(&mut entity.effects)
                .into_iter()
                .partition(|e| e.expires_at_ms <= now);
        entity.effects = pending;
        due.sort_by_key(|e| e.expires_at_ms);

        for effect in due {
            revert_effect(entity, &effect);
            debug!(tick, entity = %entity.id, id = effect.power_up_id, kind = effect.kind.name(), "effect ended");

            let event = if effect.kind == PowerUpKind::ExtraPoints {
                GameEvent::power_up_consumed(tick, entity.id, effect.power_up_id, effect.kind)
            } else {
                GameEvent::effect_expired(tick, entity.id, effect.power_up_id, effect.kind)
            };
            events.push(event);
        }
    }

    let count = events.len();
    for event in events {
        state.push_event(event);
    }
    count
}
