//! Data-driven game balance
//!
//! Every number the simulation depends on lives here so the difficulty curve
//! can be retuned without touching the tick code. Persisted in LocalStorage
//! on the web, read from a JSON file natively.

use serde::{Deserialize, Serialize};

use crate::sim::DifficultyCurve;

/// Geometry and pacing of the playfield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Playfield width in pixels
    pub width: f32,
    /// Playfield height in pixels (actor dies at or below this)
    pub height: f32,

    // === Actor ===
    /// Fixed horizontal position of the actor's centre
    pub actor_x: f32,
    /// Vertical position of the actor's centre at session start
    pub actor_start_y: f32,
    /// Visual sprite size (renderer hint only)
    pub actor_sprite: f32,
    /// Collision box edge length, smaller than the sprite so grazes feel fair
    pub actor_hitbox: f32,
    /// Velocity set by a jump (negative = upward), pixels/tick
    pub jump_impulse: f32,

    // === Obstacles ===
    /// Horizontal extent of an obstacle pair
    pub obstacle_width: f32,
    /// A new obstacle spawns once the newest one is left of `width - spawn_spacing`
    pub spawn_spacing: f32,
    /// Minimum distance from the ceiling to a gap
    pub gap_margin_top: f32,
    /// Minimum distance from the floor to a gap
    pub gap_margin_bottom: f32,

    // === Collectibles ===
    /// Visual size of a collectible
    pub collectible_size: f32,
    /// Keeps collectibles away from the pipe edges of the gap they spawn in
    pub collectible_inset: f32,
    /// Chance per tick of spawning a collectible
    pub collectible_chance: f64,
    /// Max centre distance (per axis) at which a collectible is picked up
    pub pickup_reach: f32,
    /// Score awarded per collectible
    pub collectible_bonus: u32,
    /// Inactive collectibles are compacted out every this many ticks
    pub compact_every: u64,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,

            actor_x: 100.0,
            actor_start_y: 300.0,
            actor_sprite: 60.0,
            actor_hitbox: 40.0,
            jump_impulse: -8.0,

            obstacle_width: 60.0,
            spawn_spacing: 200.0,
            gap_margin_top: 50.0,
            gap_margin_bottom: 50.0,

            collectible_size: 32.0,
            collectible_inset: 30.0,
            collectible_chance: 0.01,
            pickup_reach: 36.0,
            collectible_bonus: 5,
            compact_every: 60,
        }
    }
}

/// Full balance set: world geometry plus the score-driven difficulty curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub difficulty: DifficultyCurve,
}

impl Tuning {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "flappy_tuning";

    /// Environment variable naming a JSON tuning file (native only)
    pub const ENV_PATH: &'static str = "FLAPPY_TUNING";

    /// Parse tuning from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring invalid stored tuning: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Load tuning from the file named by `FLAPPY_TUNING`, if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_PATH) else {
            log::info!("Using default tuning");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning file {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "world": { "jump_impulse": -9.5 } }"#).unwrap();
        assert_eq!(tuning.world.jump_impulse, -9.5);
        assert_eq!(tuning.world.width, 400.0);
        assert_eq!(tuning.difficulty, DifficultyCurve::default());
    }

    #[test]
    fn test_json_round_trip_preserves_curve() {
        let mut tuning = Tuning::default();
        tuning.difficulty.min_gap = 180.0;
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Tuning::from_json("{ world: }").is_err());
    }
}
