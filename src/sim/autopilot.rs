//! Idle/demo mode: a simple pilot that aims for the lower part of the next gap

use super::state::Session;

/// How far down the gap the pilot aims (0 = top edge, 1 = bottom edge)
const AIM_FRACTION: f32 = 0.65;

/// Vertical point the pilot steers toward
pub fn target_y(session: &Session) -> f32 {
    let world = &session.tuning.world;
    let bird_left = session.bird.x - world.actor_hitbox / 2.0;

    // Nearest obstacle whose trailing edge is still ahead of the bird
    session
        .field
        .obstacles
        .iter()
        .find(|o| o.x + world.obstacle_width >= bird_left)
        .map(|o| o.gap_top + o.gap_height * AIM_FRACTION)
        .unwrap_or(world.height / 2.0)
}

/// Jump when below the target and not already climbing
pub fn should_jump(session: &Session) -> bool {
    session.bird.y > target_y(session) && session.bird.vel_y >= 0.0
}
