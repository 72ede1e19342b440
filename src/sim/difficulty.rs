//! Score-driven difficulty curve
//!
//! Each parameter moves in fixed steps every N points. Pure and cheap, so the
//! session recomputes it on every tick instead of caching.

use serde::{Deserialize, Serialize};

/// Parameters in effect for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Horizontal obstacle speed, pixels/tick
    pub speed: f32,
    /// Downward acceleration, pixels/tick²
    pub gravity: f32,
    /// Vertical opening of newly spawned obstacles, pixels
    pub gap: f32,
}

/// Step function from score to [`Difficulty`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCurve {
    pub base_speed: f32,
    pub speed_every: u32,
    pub speed_step: f32,

    pub base_gravity: f32,
    pub gravity_every: u32,
    pub gravity_step: f32,

    pub base_gap: f32,
    pub gap_every: u32,
    pub gap_step: f32,
    /// Gap never shrinks below this
    pub min_gap: f32,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            base_speed: 5.0,
            speed_every: 10,
            speed_step: 0.2,

            base_gravity: 0.5,
            gravity_every: 25,
            gravity_step: 0.05,

            base_gap: 290.0,
            gap_every: 15,
            gap_step: 5.0,
            min_gap: 200.0,
        }
    }
}

/// Number of whole steps reached at `score`. A zero interval never steps.
#[inline]
fn steps(score: u32, every: u32) -> f32 {
    score.checked_div(every).unwrap_or(0) as f32
}

impl DifficultyCurve {
    pub fn difficulty_for(&self, score: u32) -> Difficulty {
        let speed = self.base_speed + steps(score, self.speed_every) * self.speed_step;
        let gravity = self.base_gravity + steps(score, self.gravity_every) * self.gravity_step;
        let gap = (self.base_gap - steps(score, self.gap_every) * self.gap_step).max(self.min_gap);
        Difficulty {
            speed,
            gravity,
            gap,
        }
    }
}
