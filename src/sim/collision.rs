//! Collision predicates between the bird and field entities
//!
//! Everything is an axis-aligned box. Edges are inclusive: touching counts
//! as a hit. These are pure checks; the session decides what a hit means.

use glam::Vec2;

use super::actor::Bird;
use super::field::{Collectible, Obstacle};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square box of edge `size` centred on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Inclusive overlap test
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// The bird's collision box
#[inline]
pub fn bird_hitbox(bird: &Bird, hitbox: f32) -> Aabb {
    Aabb::centered(Vec2::new(bird.x, bird.y), hitbox)
}

/// Top and bottom segments of an obstacle pair
pub fn obstacle_boxes(obstacle: &Obstacle, width: f32, world_height: f32) -> [Aabb; 2] {
    let left = obstacle.x;
    let right = obstacle.x + width;
    [
        Aabb::new(Vec2::new(left, 0.0), Vec2::new(right, obstacle.gap_top)),
        Aabb::new(
            Vec2::new(left, obstacle.gap_bottom()),
            Vec2::new(right, world_height),
        ),
    ]
}

/// Whether the bird's hitbox touches either segment of the obstacle
pub fn collides_with_obstacle(
    bird: &Bird,
    hitbox: f32,
    obstacle: &Obstacle,
    obstacle_width: f32,
    world_height: f32,
) -> bool {
    let bird_box = bird_hitbox(bird, hitbox);
    obstacle_boxes(obstacle, obstacle_width, world_height)
        .iter()
        .any(|segment| bird_box.overlaps(segment))
}

/// Whether the bird is close enough to grab a collectible.
///
/// Compares centres per axis against `reach`, which is meant to exceed half
/// the bird hitbox so pickups are more forgiving than pipes.
pub fn collides_with_collectible(bird: &Bird, reach: f32, collectible: &Collectible) -> bool {
    if !collectible.active {
        return false;
    }
    let delta = (collectible.pos - Vec2::new(bird.x, bird.y)).abs();
    delta.x <= reach && delta.y <= reach
}
