//! Simulation Tick
//!
//! One discrete step of the whole world. Deterministic for a given seed
//! and input sequence.
//!
//! ## Order of operations
//!
//! ```text
//! 1. advance tick counter and simulated clock
//! 2. run expired effect records
//! 3. apply player input (move, jump, use power-up)
//! 4. physics: player, then each bot (decide, step, fall)
//! 5. player/bot collisions, then board pickups
//! 6. power-up spawn roll
//! 7. score += 1
//! 8. bot power-ups (random grant, re-apply)
//! 9. speed ramp
//! ```

#[cfg(feature = "debug-tracing")]
use tracing::trace;
use tracing::info;

use crate::game::bot::steer;
use crate::game::collision::{resolve_bot_collisions, resolve_pickups};
use crate::game::config::{SessionConfig, SimConfig};
use crate::game::events::GameEvent;
use crate::game::input::{InputFrame, InputRecording};
use crate::game::physics::advance;
use crate::game::power_up::{expire_effects, maybe_spawn_power_up, process_bot_power_ups, use_power_up};
use crate::game::state::SimulationState;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, sorted by priority then entity.
    /// Events with the same key keep their emission order.
    pub events: Vec<GameEvent>,
    /// New tick period when the timer must be restarted
    pub period_changed: Option<u64>,
}

/// Run one simulation tick.
///
/// # Determinism
///
/// - Entities are visited player first, then bots by index
/// - Board power-ups are visited in id order (BTreeMap)
/// - All randomness comes from `state.rng`
/// - Positions and speeds are fixed-point
pub fn tick(state: &mut SimulationState, input: &InputFrame) -> TickResult {
    let mut result = TickResult::default();

    state.tick += 1;
    state.clock_ms = state.clock_ms.saturating_add(state.scheduler.period_ms());

    expire_effects(state);

    apply_input(state, input);

    update_physics(state);

    resolve_bot_collisions(state);
    resolve_pickups(state);

    maybe_spawn_power_up(state);

    state.score += 1;

    process_bot_power_ups(state);

    if let Some(period_ms) = state.scheduler.on_score(state.score) {
        info!(tick = state.tick, score = state.score, period_ms, "speed increased");
        state.push_event(GameEvent::speed_increased(state.tick, period_ms));
        result.period_changed = Some(period_ms);
    }

    #[cfg(feature = "debug-tracing")]
    trace!(
        tick = state.tick,
        clock_ms = state.clock_ms,
        points = state.points,
        player_x = state.player.position.x,
        player_y = state.player.position.y,
        "tick complete"
    );

    let mut events = state.take_events();
    events.sort();
    result.events = events;
    result
}

/// Apply the player's input: horizontal step, jump, use.
fn apply_input(state: &mut SimulationState, input: &InputFrame) {
    let player = &mut state.player;

    match input.direction() {
        1 => player.step_x(player.speed),
        -1 => player.step_x(player.speed.saturating_neg()),
        _ => {}
    }

    if input.jump_requested() {
        player.try_jump(state.sim.physics.jump_force);
    }

    if input.use_power_up() {
        use_power_up(state);
    }
}

/// Vertical motion for the player, then each bot's move and fall.
fn update_physics(state: &mut SimulationState) {
    advance(&mut state.player, &state.platforms, &state.sim.physics);

    for bot in state.bots.iter_mut() {
        steer(bot, &state.player, &mut state.rng, &state.sim.bots);
        advance(bot, &state.platforms, &state.sim.physics);
    }
}

/// Replay a session from recorded inputs.
///
/// Returns the final state and every event in order.
pub fn replay_session(
    session: SessionConfig,
    sim: SimConfig,
    recording: &InputRecording,
) -> (SimulationState, Vec<GameEvent>) {
    let mut state = SimulationState::new(session, sim);
    let mut all_events = Vec::new();

    for (_, frame) in recording.replay_iter() {
        let result = tick(&mut state, &frame);
        all_events.extend(result.events);
    }

    (state, all_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, PLAYER_BASE_SPEED};
    use crate::core::rng::Chance;
    use crate::core::vec2::FixedVec2;
    use crate::game::events::GameEventData;
    use crate::game::state::{EntityId, PowerUp, PowerUpKind};

    fn new_state() -> SimulationState {
        SimulationState::new(SessionConfig::default(), SimConfig::default())
    }

    fn quiet_state() -> SimulationState {
        let mut sim = SimConfig::default();
        sim.power_ups.spawn_chance = Chance::NEVER;
        sim.power_ups.bot_grant_chance = Chance::NEVER;
        SimulationState::new(SessionConfig::default(), sim)
    }

    #[test]
    fn test_tick_determinism() {
        let mut state1 = new_state();
        let mut state2 = new_state();

        for t in 0..500u64 {
            let input = match t % 40 {
                0..=9 => InputFrame::right(),
                10 => InputFrame::new().jumping(),
                20..=29 => InputFrame::left(),
                30 => InputFrame::new().using_power_up(),
                _ => InputFrame::new(),
            };
            tick(&mut state1, &input);
            tick(&mut state2, &input);
        }

        assert_eq!(state1.tick, 500);
        assert_eq!(state1.compute_hash(), state2.compute_hash());
        assert_eq!(state1.points, state2.points);
    }

    #[test]
    fn test_clock_and_score_advance() {
        let mut state = new_state();
        tick(&mut state, &InputFrame::new());
        tick(&mut state, &InputFrame::new());

        assert_eq!(state.tick, 2);
        assert_eq!(state.score, 2);
        assert_eq!(state.clock_ms, 200);
    }

    #[test]
    fn test_player_movement() {
        let mut state = quiet_state();

        tick(&mut state, &InputFrame::right());
        assert_eq!(state.player.position.x, from_int(55));

        tick(&mut state, &InputFrame::left());
        tick(&mut state, &InputFrame::left());
        assert_eq!(state.player.position.x, from_int(45));

        // Inside the dead zone
        tick(&mut state, &InputFrame::with_axis(30));
        assert_eq!(state.player.position.x, from_int(45));
    }

    #[test]
    fn test_jump_sequence_through_tick() {
        let mut state = quiet_state();

        tick(&mut state, &InputFrame::new().jumping());
        assert_eq!(state.player.velocity_y, from_int(14));
        assert_eq!(state.player.position.y, from_int(14));

        let expected = [(13, 27), (12, 39), (11, 50), (10, 60)];
        for (v, y) in expected {
            // Holding jump mid-air does nothing
            tick(&mut state, &InputFrame::new().jumping());
            assert_eq!(state.player.velocity_y, from_int(v));
            assert_eq!(state.player.position.y, from_int(y));
        }
    }

    #[test]
    fn test_use_power_up_from_input() {
        let mut state = quiet_state();
        state.player.held = Some(PowerUp::new(9, PowerUpKind::SpeedBoost, FixedVec2::ZERO));

        let result = tick(&mut state, &InputFrame::new().using_power_up());
        assert!(state.player.held.is_none());
        assert!(state.player.speed > PLAYER_BASE_SPEED);
        assert!(result.events.iter().any(|e| matches!(
            e.data,
            GameEventData::PowerUpApplied { entity: EntityId::Player, .. }
        )));

        // Applied at clock 100, reverted on the tick where clock reaches 5100
        for _ in 0..49 {
            tick(&mut state, &InputFrame::new());
        }
        assert_eq!(state.clock_ms, 5_000);
        assert!(state.player.speed > PLAYER_BASE_SPEED);

        tick(&mut state, &InputFrame::new());
        assert_eq!(state.clock_ms, 5_100);
        assert_eq!(state.player.speed, PLAYER_BASE_SPEED);
    }

    #[test]
    fn test_events_sorted_by_priority() {
        let mut state = quiet_state();
        state.player.held = Some(PowerUp::new(9, PowerUpKind::ExtraPoints, FixedVec2::ZERO));
        state.player.position = FixedVec2::from_ints(100, 41);
        state.player.velocity_y = from_int(-1);
        state.player.is_jumping = true;

        // Use fires before the stomp, but collisions sort first
        let result = tick(&mut state, &InputFrame::new().using_power_up());
        let events = &result.events;

        assert!(matches!(events[0].data, GameEventData::BotStomped { bot: EntityId::Bot(0), .. }));
        assert!(events.windows(2).all(|w| w[0] <= w[1]));

        let applied = events.iter().position(|e| matches!(e.data, GameEventData::PowerUpApplied { .. }));
        let consumed = events.iter().position(|e| matches!(e.data, GameEventData::PowerUpConsumed { .. }));
        assert!(applied.is_some());
        assert!(applied < consumed);
        assert_eq!(state.points, 60);
    }

    #[test]
    fn test_speed_ramp() {
        let mut state = new_state();
        state.score = 999;

        let result = tick(&mut state, &InputFrame::new());
        assert_eq!(result.period_changed, Some(95));
        assert_eq!(state.scheduler.period_ms(), 95);
        assert!(result.events.iter().any(|e| matches!(
            e.data,
            GameEventData::SpeedIncreased { period_ms: 95 }
        )));

        // The next tick advances the clock by the new period
        let result = tick(&mut state, &InputFrame::new());
        assert_eq!(result.period_changed, None);
        assert_eq!(state.clock_ms, 195);
    }

    #[test]
    fn test_replay_matches_live_run() {
        let mut recording = InputRecording::new();
        let mut live = new_state();

        for t in 1..=300u64 {
            let input = if t % 25 == 0 {
                InputFrame::right().jumping()
            } else if t % 7 == 0 {
                InputFrame::left()
            } else {
                InputFrame::right()
            };
            recording.record(t, input);
            tick(&mut live, &input);
        }

        let (replayed, _) = replay_session(SessionConfig::default(), SimConfig::default(), &recording);
        assert_eq!(replayed.tick, 300);
        assert_eq!(replayed.compute_hash(), live.compute_hash());
    }
}
