//! Vertical Motion and Platform Landing
//!
//! One tick of gravity for a single entity, followed by the ground clamp
//! and the platform landing pass.
//!
//! ## Update order
//!
//! ```text
//! velocity_y -= GRAVITY        (velocity first)
//! y          += velocity_y     (then position, y points up)
//! ```
//!
//! With JUMP_FORCE = 15 and GRAVITY = 1 a jump from the ground reads
//! v = 14, 13, 12, 11, 10 and y = 14, 27, 39, 50, 60 over five ticks.

use crate::core::fixed::Fixed;
use crate::game::config::PhysicsConfig;
use crate::game::state::{Entity, Platform};

/// Outcome of one vertical step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Support {
    /// Still airborne
    Airborne,
    /// Resting on the board floor
    Ground,
    /// Landed on the platform at this index
    Platform(usize),
}

/// Advance one entity's vertical motion by one tick.
///
/// Platforms are evaluated in slice order; when several qualify the last
/// one wins.
pub fn advance(entity: &mut Entity, platforms: &[Platform], physics: &PhysicsConfig) -> Support {
    entity.velocity_y = entity.velocity_y.saturating_sub(physics.gravity);
    entity.position.y = entity.position.y.saturating_add(entity.velocity_y);

    let mut support = Support::Airborne;

    if entity.position.y <= 0 {
        entity.position.y = 0;
        entity.velocity_y = 0;
        entity.is_jumping = false;
        support = Support::Ground;
    }

    let ceiling = entity.max_y();
    if entity.position.y > ceiling {
        entity.position.y = ceiling;
        entity.velocity_y = entity.velocity_y.min(0);
    }

    for (index, platform) in platforms.iter().enumerate() {
        if lands_on(entity, platform) {
            entity.position.y = platform.top();
            entity.velocity_y = 0;
            entity.is_jumping = false;
            support = Support::Platform(index);
        }
    }

    // Nothing underfoot: walking off an edge counts as a fall
    if support == Support::Airborne {
        entity.is_jumping = true;
    }

    support
}

/// Landing test: horizontal overlap, vertical band intersection, and not rising.
#[inline]
pub fn lands_on(entity: &Entity, platform: &Platform) -> bool {
    let bounds = entity.bounds();
    bounds.overlaps_x(&platform.bounds)
        && bounds.overlaps_y(&platform.bounds)
        && entity.velocity_y <= 0
}

/// Apply an upward bounce (used when a bot is stomped).
pub fn bounce(entity: &mut Entity, velocity: Fixed) {
    entity.velocity_y = velocity;
    entity.is_jumping = true;
}
