//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, network or platform dependencies

pub mod actor;
pub mod autopilot;
pub mod collision;
pub mod difficulty;
pub mod field;
pub mod state;
pub mod tick;

pub use actor::Bird;
pub use collision::{Aabb, collides_with_collectible, collides_with_obstacle};
pub use difficulty::{Difficulty, DifficultyCurve};
pub use field::{Collectible, FieldLayout, Obstacle, ObstacleField};
pub use state::{CrashCause, Session, SessionEvent, SessionPhase};
pub use tick::{TickInput, tick};
