//! Obstacle pairs and collectibles scrolling toward the bird
//!
//! Obstacles are kept in spawn order, which is also left-to-right order since
//! they all move at the same speed, so off-screen removal only ever pops the
//! front. Collectibles are flagged inactive when picked up or scrolled away
//! and compacted in batches.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::character::Instrument;
use crate::tuning::WorldTuning;

/// A top + bottom barrier sharing one horizontal position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Bottom edge of the top segment
    pub gap_top: f32,
    pub gap_height: f32,
    /// Set once the bird has passed this pair. Never cleared.
    pub scored: bool,
}

impl Obstacle {
    /// Top edge of the bottom segment
    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_top + self.gap_height
    }
}

/// A bonus pickup spawned inside an obstacle's gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    /// Centre position
    pub pos: Vec2,
    pub kind: Instrument,
    pub active: bool,
}

/// Per-entity dimensions the field needs; world size is passed per call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldLayout {
    pub obstacle_width: f32,
    pub spawn_spacing: f32,
    pub gap_margin_top: f32,
    pub gap_margin_bottom: f32,
    pub collectible_size: f32,
    pub collectible_inset: f32,
}

impl From<&WorldTuning> for FieldLayout {
    fn from(world: &WorldTuning) -> Self {
        Self {
            obstacle_width: world.obstacle_width,
            spawn_spacing: world.spawn_spacing,
            gap_margin_top: world.gap_margin_top,
            gap_margin_bottom: world.gap_margin_bottom,
            collectible_size: world.collectible_size,
            collectible_inset: world.collectible_inset,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObstacleField {
    pub layout: FieldLayout,
    /// Live obstacles, oldest (leftmost) first
    pub obstacles: VecDeque<Obstacle>,
    /// Collectibles, including inactive ones awaiting compaction
    pub collectibles: Vec<Collectible>,
    next_id: u32,
}

impl ObstacleField {
    pub fn new(layout: FieldLayout) -> Self {
        Self {
            layout,
            obstacles: VecDeque::new(),
            collectibles: Vec::new(),
            next_id: 1,
        }
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Most recently spawned obstacle
    pub fn latest(&self) -> Option<&Obstacle> {
        self.obstacles.back()
    }

    /// Append an obstacle to the right end of the field
    pub fn push_obstacle(&mut self, x: f32, gap_top: f32, gap_height: f32) -> u32 {
        let id = self.next_entity_id();
        self.obstacles.push_back(Obstacle {
            id,
            x,
            gap_top,
            gap_height,
            scored: false,
        });
        id
    }

    pub fn push_collectible(&mut self, pos: Vec2, kind: Instrument) -> u32 {
        let id = self.next_entity_id();
        self.collectibles.push(Collectible {
            id,
            pos,
            kind,
            active: true,
        });
        id
    }

    /// Scroll everything left by `speed`
    pub fn advance(&mut self, speed: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.x -= speed;
        }
        for collectible in self.collectibles.iter_mut().filter(|c| c.active) {
            collectible.pos.x -= speed;
        }
    }

    /// Spawn a new obstacle at the right edge when the field is empty or the
    /// newest obstacle has moved `spawn_spacing` away from it.
    ///
    /// The gap's top edge is uniform in `[margin_top, height - gap - margin_bottom]`.
    pub fn maybe_spawn_obstacle<R: Rng>(
        &mut self,
        rng: &mut R,
        world_width: f32,
        world_height: f32,
        gap: f32,
    ) -> bool {
        let due = match self.obstacles.back() {
            None => true,
            Some(last) => last.x < world_width - self.layout.spawn_spacing,
        };
        if !due {
            return false;
        }

        let lo = self.layout.gap_margin_top;
        let hi = world_height - gap - self.layout.gap_margin_bottom;
        let gap_top = if hi > lo {
            rng.random_range(lo..=hi)
        } else {
            lo
        };

        let id = self.push_obstacle(world_width, gap_top, gap);
        log::trace!("Spawned obstacle {} (gap {:.0} at {:.0})", id, gap, gap_top);
        true
    }

    /// With the given per-tick probability, spawn a collectible at the right
    /// edge inside the newest obstacle's gap (inset from both pipe edges).
    pub fn maybe_spawn_collectible<R: Rng>(
        &mut self,
        rng: &mut R,
        probability: f64,
        world_width: f32,
        kind: Instrument,
    ) -> bool {
        let Some(latest) = self.obstacles.back() else {
            return false;
        };
        if probability.is_nan() || probability <= 0.0 || !rng.random_bool(probability.min(1.0)) {
            return false;
        }

        let lo = latest.gap_top + self.layout.collectible_inset;
        let hi = latest.gap_bottom() - self.layout.collectible_inset;
        let y = if hi > lo {
            rng.random_range(lo..=hi)
        } else {
            (latest.gap_top + latest.gap_bottom()) / 2.0
        };

        let id = self.push_collectible(Vec2::new(world_width, y), kind);
        log::trace!("Spawned {} collectible {} at y={:.0}", kind.as_str(), id, y);
        true
    }

    /// Drop obstacles, and deactivate collectibles, that are fully behind the left edge
    pub fn remove_offscreen(&mut self) {
        let width = self.layout.obstacle_width;
        while self.obstacles.front().is_some_and(|o| o.x + width < 0.0) {
            self.obstacles.pop_front();
        }

        let half = self.layout.collectible_size / 2.0;
        for collectible in self.collectibles.iter_mut().filter(|c| c.active) {
            if collectible.pos.x + half < 0.0 {
                collectible.active = false;
            }
        }
    }

    /// Mark every obstacle whose trailing edge has passed `actor_x` as scored.
    /// Returns how many were newly scored; each obstacle counts exactly once.
    pub fn score_events(&mut self, actor_x: f32) -> u32 {
        let width = self.layout.obstacle_width;
        let mut passed = 0;
        for obstacle in self.obstacles.iter_mut().filter(|o| !o.scored) {
            if obstacle.x + width < actor_x {
                obstacle.scored = true;
                passed += 1;
            }
        }
        passed
    }

    /// Remove inactive collectibles. Returns how many were dropped.
    pub fn compact(&mut self) -> usize {
        let before = self.collectibles.len();
        self.collectibles.retain(|c| c.active);
        before - self.collectibles.len()
    }

    pub fn active_collectibles(&self) -> impl Iterator<Item = &Collectible> {
        self.collectibles.iter().filter(|c| c.active)
    }
}
