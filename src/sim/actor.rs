//! The player's bird: a body that only moves vertically

use serde::{Deserialize, Serialize};

/// Vertical kinematic body. `x` never changes during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    /// Fixed horizontal centre
    pub x: f32,
    /// Vertical centre (0 = ceiling, grows downward)
    pub y: f32,
    /// Vertical velocity, pixels/tick (positive = falling)
    pub vel_y: f32,
}

impl Bird {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, vel_y: 0.0 }
    }

    /// Integrate one tick of gravity (semi-implicit Euler)
    pub fn apply_gravity(&mut self, gravity: f32) {
        self.vel_y += gravity;
        self.y += self.vel_y;
    }

    /// Replace the current velocity with the jump impulse. Jumps never stack.
    pub fn jump(&mut self, impulse: f32) {
        self.vel_y = impulse;
    }

    /// Above the ceiling or at/below the floor
    pub fn is_out_of_bounds(&self, world_height: f32) -> bool {
        self.y < 0.0 || self.y >= world_height
    }
}
