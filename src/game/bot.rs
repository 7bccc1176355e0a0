//! Bot Decision Policy
//!
//! Per tick, each bot takes one horizontal step of its own speed:
//! toward the player when close and a coin flip says so, otherwise in a
//! random direction. Vertical motion goes through `physics::advance`.

use crate::core::fixed::{Fixed, fixed_abs};
use crate::core::rng::DeterministicRng;
use crate::game::config::BotConfig;
use crate::game::state::Entity;

/// Horizontal decision for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotMove {
    /// Step toward the player's center (0 when already aligned)
    Chase(Fixed),
    /// Random step left or right
    Wander(Fixed),
}

impl BotMove {
    /// Signed horizontal step.
    #[inline]
    pub fn step(self) -> Fixed {
        match self {
            BotMove::Chase(dx) | BotMove::Wander(dx) => dx,
        }
    }
}

/// Decide this tick's horizontal step for `bot`.
///
/// The chase coin is only flipped when the player is within range.
pub fn decide(
    bot: &Entity,
    player: &Entity,
    rng: &mut DeterministicRng,
    config: &BotConfig,
) -> BotMove {
    let player_center = player.bounds().center_x();
    let bot_center = bot.bounds().center_x();

    if fixed_abs(player_center - bot_center) < config.chase_range && rng.roll(config.chase_chance) {
        let dx = match player_center.cmp(&bot_center) {
            std::cmp::Ordering::Greater => bot.speed,
            std::cmp::Ordering::Less => -bot.speed,
            std::cmp::Ordering::Equal => 0,
        };
        return BotMove::Chase(dx);
    }

    if rng.roll(config.wander_right_chance) {
        BotMove::Wander(bot.speed)
    } else {
        BotMove::Wander(-bot.speed)
    }
}

/// Decide and apply the horizontal step, clamped to the board.
pub fn steer(bot: &mut Entity, player: &Entity, rng: &mut DeterministicRng, config: &BotConfig) -> BotMove {
    let decision = decide(bot, player, rng, config);
    bot.step_x(decision.step());
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, BOARD_WIDTH};
    use crate::core::rng::Chance;
    use crate::core::vec2::FixedVec2;
    use crate::game::state::EntityId;

    fn bot_at(x: i32) -> Entity {
        Entity::new(EntityId::Bot(0), FixedVec2::from_ints(x, 0), from_int(2))
    }

    fn player_at(x: i32) -> Entity {
        Entity::new(EntityId::Player, FixedVec2::from_ints(x, 0), from_int(5))
    }

    fn always_chase() -> BotConfig {
        BotConfig {
            chase_chance: Chance::ALWAYS,
            ..BotConfig::default()
        }
    }

    #[test]
    fn test_chases_nearby_player() {
        let mut rng = DeterministicRng::new(1);
        let config = always_chase();

        let right = decide(&bot_at(100), &player_at(130), &mut rng, &config);
        assert_eq!(right, BotMove::Chase(from_int(2)));

        let left = decide(&bot_at(100), &player_at(60), &mut rng, &config);
        assert_eq!(left, BotMove::Chase(from_int(-2)));

        let aligned = decide(&bot_at(100), &player_at(100), &mut rng, &config);
        assert_eq!(aligned, BotMove::Chase(0));
    }

    #[test]
    fn test_range_is_strict() {
        let mut rng = DeterministicRng::new(1);
        let config = always_chase();

        // Centers exactly 50 apart: out of range
        let decision = decide(&bot_at(100), &player_at(150), &mut rng, &config);
        assert!(matches!(decision, BotMove::Wander(_)));
    }

    #[test]
    fn test_wanders_when_far() {
        let mut rng = DeterministicRng::new(7);
        let config = always_chase();

        for _ in 0..100 {
            let decision = decide(&bot_at(400), &player_at(50), &mut rng, &config);
            match decision {
                BotMove::Wander(dx) => assert!(dx == from_int(2) || dx == from_int(-2)),
                BotMove::Chase(_) => panic!("far bot must not chase"),
            }
        }
    }

    #[test]
    fn test_wander_direction_is_forced_by_chance() {
        let mut rng = DeterministicRng::new(7);
        let config = BotConfig {
            chase_chance: Chance::NEVER,
            wander_right_chance: Chance::ALWAYS,
            ..BotConfig::default()
        };

        let decision = decide(&bot_at(100), &player_at(110), &mut rng, &config);
        assert_eq!(decision, BotMove::Wander(from_int(2)));
    }

    #[test]
    fn test_wander_is_roughly_balanced() {
        let mut rng = DeterministicRng::new(2024);
        let config = BotConfig::default();
        let bot = bot_at(400);
        let player = player_at(50);

        let rights = (0..10_000)
            .filter(|_| decide(&bot, &player, &mut rng, &config).step() > 0)
            .count();
        assert!((4_500..5_500).contains(&rights), "rights = {}", rights);
    }

    #[test]
    fn test_steer_clamps_to_board() {
        let mut rng = DeterministicRng::new(3);
        let config = BotConfig {
            chase_chance: Chance::NEVER,
            wander_right_chance: Chance::NEVER,
            ..BotConfig::default()
        };
        let player = player_at(500);

        let mut bot = bot_at(1);
        steer(&mut bot, &player, &mut rng, &config);
        assert_eq!(bot.position.x, 0);

        let config = BotConfig {
            wander_right_chance: Chance::ALWAYS,
            ..config
        };
        let mut bot = bot_at(569);
        steer(&mut bot, &player, &mut rng, &config);
        assert_eq!(bot.position.x, BOARD_WIDTH - bot.width);
    }
}
