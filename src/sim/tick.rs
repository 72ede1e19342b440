//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically.

use super::autopilot;
use super::collision::{collides_with_collectible, collides_with_obstacle};
use super::state::{CrashCause, Session, SessionEvent, SessionPhase};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap (click/tap/space). The first one starts the session.
    pub jump: bool,
    /// Idle/demo mode - autopilot flies the bird
    pub idle_mode: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput) {
    if session.phase == SessionPhase::Over {
        return;
    }

    let wants_jump = if input.idle_mode {
        session.phase == SessionPhase::Ready || autopilot::should_jump(session)
    } else {
        input.jump
    };
    if wants_jump {
        session.jump();
    }

    // Spawning and physics stay frozen until the first flap
    if session.phase != SessionPhase::Running {
        return;
    }

    session.time_ticks += 1;
    let world = session.tuning.world.clone();

    // 1. Difficulty from the current score
    let difficulty = session.tuning.difficulty.difficulty_for(session.score);
    session.difficulty = difficulty;

    // 2. Bird physics
    session.bird.apply_gravity(difficulty.gravity);

    // 3. Ceiling / floor
    if session.bird.is_out_of_bounds(world.height) {
        session.end(CrashCause::OutOfBounds);
        return;
    }

    // 4. Scroll the field
    session.field.advance(difficulty.speed);
    session.field.remove_offscreen();

    // 5. Spawning
    session
        .field
        .maybe_spawn_obstacle(&mut session.rng, world.width, world.height, difficulty.gap);
    session.field.maybe_spawn_collectible(
        &mut session.rng,
        world.collectible_chance,
        world.width,
        session.character.instrument(),
    );

    // 6. Pipes
    let crashed = session.field.obstacles.iter().any(|obstacle| {
        collides_with_obstacle(
            &session.bird,
            world.actor_hitbox,
            obstacle,
            world.obstacle_width,
            world.height,
        )
    });
    if crashed {
        session.end(CrashCause::Obstacle);
        return;
    }

    // 7. Collectibles
    let instrument = session.character.instrument();
    for collectible in session.field.collectibles.iter_mut() {
        if collectible.kind != instrument
            || !collides_with_collectible(&session.bird, world.pickup_reach, collectible)
        {
            continue;
        }
        collectible.active = false;
        session.score += world.collectible_bonus;
        session.events.push(SessionEvent::Collected {
            instrument,
            score: session.score,
        });
        log::debug!("Collected {} (score {})", instrument.as_str(), session.score);
    }

    // 8. Pass-through scoring
    let passed = session.field.score_events(session.bird.x);
    if passed > 0 {
        session.score += passed;
        session.events.push(SessionEvent::ObstaclePassed {
            score: session.score,
        });
    }

    // 9. Batched cleanup
    if world.compact_every > 0 && session.time_ticks.is_multiple_of(world.compact_every) {
        let dropped = session.field.compact();
        if dropped > 0 {
            log::trace!("Compacted {} collectibles", dropped);
        }
    }
}
