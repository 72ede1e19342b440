//! Session state and core simulation types
//!
//! A [`Session`] is one play from the first flap to the crash. It is built
//! fresh for every play and never reused.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::Bird;
use super::difficulty::Difficulty;
use super::field::{FieldLayout, ObstacleField};
use crate::character::{Character, Instrument};
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    /// Bird hovering, waiting for the first flap. Nothing spawns.
    Ready,
    /// Active gameplay
    Running,
    /// Crashed. Terminal.
    Over,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrashCause {
    /// Left the playfield through the ceiling or the floor
    OutOfBounds,
    /// Touched a pipe
    Obstacle,
}

/// Things that happened during a tick, for sound and effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    Started,
    Flapped,
    ObstaclePassed { score: u32 },
    Collected { instrument: Instrument, score: u32 },
    Crashed { cause: CrashCause, final_score: u32 },
}

/// One play of the game
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub character: Character,
    pub phase: SessionPhase,
    pub bird: Bird,
    pub field: ObstacleField,
    /// Never decreases
    pub score: u32,
    /// Parameters used by the most recent tick
    pub difficulty: Difficulty,
    /// Simulation tick counter (running ticks only)
    pub time_ticks: u64,
    /// Frozen when the session ends
    pub final_score: Option<u32>,
    /// Events since the last drain
    pub events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(character: Character, tuning: Tuning, seed: u64) -> Self {
        let world = &tuning.world;
        let bird = Bird::new(world.actor_x, world.actor_start_y);
        let field = ObstacleField::new(FieldLayout::from(world));
        let difficulty = tuning.difficulty.difficulty_for(0);

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            character,
            phase: SessionPhase::Ready,
            bird,
            field,
            score: 0,
            difficulty,
            time_ticks: 0,
            final_score: None,
            events: Vec::new(),
        }
    }

    /// Flap. The first flap also starts the session. Ignored once over.
    ///
    /// Returns whether the input had any effect.
    pub fn jump(&mut self) -> bool {
        match self.phase {
            SessionPhase::Over => false,
            SessionPhase::Ready => {
                self.phase = SessionPhase::Running;
                self.events.push(SessionEvent::Started);
                log::info!(
                    "Session started (seed {}, character {})",
                    self.seed,
                    self.character.key()
                );
                self.flap();
                true
            }
            SessionPhase::Running => {
                self.flap();
                true
            }
        }
    }

    fn flap(&mut self) {
        self.bird.jump(self.tuning.world.jump_impulse);
        self.events.push(SessionEvent::Flapped);
    }

    /// Enter the terminal phase and freeze the score
    pub(crate) fn end(&mut self, cause: CrashCause) {
        if self.phase == SessionPhase::Over {
            return;
        }
        self.phase = SessionPhase::Over;
        self.final_score = Some(self.score);
        self.events.push(SessionEvent::Crashed {
            cause,
            final_score: self.score,
        });
        log::info!(
            "Session over after {} ticks: {:?}, score {}",
            self.time_ticks,
            cause,
            self.score
        );
    }

    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::Over
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_ready_at_spawn_point() {
        let session = Session::new(Character::Diego, Tuning::default(), 7);
        assert_eq!(session.phase, SessionPhase::Ready);
        assert_eq!(session.bird.x, 100.0);
        assert_eq!(session.bird.y, 300.0);
        assert_eq!(session.score, 0);
        assert!(session.field.obstacles.is_empty());
    }

    #[test]
    fn test_first_jump_starts_and_flaps() {
        let mut session = Session::new(Character::Fonso, Tuning::default(), 7);
        assert!(session.jump());
        assert_eq!(session.phase, SessionPhase::Running);
        assert_eq!(session.bird.vel_y, -8.0);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::Started, SessionEvent::Flapped]
        );
        assert!(session.events.is_empty());
    }

    #[test]
    fn test_end_is_irreversible() {
        let mut session = Session::new(Character::Fonso, Tuning::default(), 7);
        session.jump();
        session.score = 12;
        session.end(CrashCause::Obstacle);
        session.score = 99;
        session.end(CrashCause::OutOfBounds);

        assert_eq!(session.final_score, Some(12));
        assert!(!session.jump());
        assert_eq!(session.phase, SessionPhase::Over);
        let crashes = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::Crashed { .. }))
            .count();
        assert_eq!(crashes, 1);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        assert_eq!(serde_json::to_value(SessionPhase::Running).unwrap(), "running");
        assert_eq!(
            serde_json::to_value(SessionEvent::Crashed {
                cause: CrashCause::OutOfBounds,
                final_score: 4,
            })
            .unwrap(),
            serde_json::json!({ "crashed": { "cause": "outOfBounds", "finalScore": 4 } })
        );
    }
}
