//! Player movement and the player-attached torch

use glam::Vec2;

use crate::consts::*;
use crate::sim::grid::Grid;
use crate::sim::raycast;
use crate::{heading_to_dir, normalize_angle};

/// The player avatar. Drives the torch pose and the bullet spawn origin.
#[derive(Debug, Clone)]
pub struct Player {
    /// Position in grid-cell coordinates
    pub position: Vec2,
    pub velocity: Vec2,
    /// Facing in radians
    pub heading: f32,
    pub health: i32,
    /// Ticks until the next shot is allowed
    pub cooldown: i32,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            heading: 0.0,
            health: 100,
            cooldown: 0,
        }
    }

    /// Advance one tick: turn toward the aim point, accelerate along the
    /// movement axes, apply friction and the speed cap, then attempt the
    /// move with a ray cast against the grid. A blocked move zeroes the
    /// velocity component that would have changed cell. Also counts the
    /// fire cooldown down.
    pub fn update(&mut self, grid: &Grid, move_axis: Vec2, aim: Option<Vec2>) {
        if let Some(target) = aim {
            let to_target = target - self.position;
            if to_target != Vec2::ZERO {
                let target_heading = to_target.y.atan2(to_target.x);
                let diff = normalize_angle(target_heading - self.heading);
                if diff.abs() < PLAYER_TURN_SPEED {
                    self.heading = target_heading;
                } else {
                    self.heading += PLAYER_TURN_SPEED.copysign(diff);
                }
                self.heading = normalize_angle(self.heading);
            }
        }

        self.velocity += move_axis * PLAYER_ACCELERATION;
        self.velocity *= 1.0 - PLAYER_FRICTION;
        self.velocity = self.velocity.clamp_length_max(PLAYER_MAX_SPEED);

        let next = self.position + self.velocity;
        let w = grid.width() as f32;
        let h = grid.height() as f32;
        if next.x >= 0.0 && next.x < w && next.y >= 0.0 && next.y < h {
            // Sub-cell moves fit inside the segment cast's step budget, so
            // probe the destination cell as well
            let blocked = raycast::cast(grid, self.position, next).is_some()
                || grid.get(next.x as i32, next.y as i32).height.blocks();
            if !blocked {
                self.position = next;
            } else {
                if next.x as i32 != self.position.x as i32 {
                    self.velocity.x = 0.0;
                }
                if next.y as i32 != self.position.y as i32 {
                    self.velocity.y = 0.0;
                }
            }
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
        }
    }

    /// Current facing as a unit vector
    pub fn facing(&self) -> Vec2 {
        heading_to_dir(self.heading)
    }
}

/// Player-attached cone light with a breathing radius
#[derive(Debug, Clone, Copy)]
pub struct Torch {
    pub position: Vec2,
    /// Unit facing vector
    pub direction: Vec2,
    pub base_radius: f32,
    /// Oscillates around `base_radius` over time
    pub current_radius: f32,
}

impl Torch {
    pub fn new(position: Vec2, base_radius: f32) -> Self {
        Self {
            position,
            direction: Vec2::X,
            base_radius,
            current_radius: base_radius,
        }
    }

    /// Follow the player and breathe. `total_time` is seconds since session
    /// start; the oscillation is cosmetic and independent of gameplay state.
    pub fn update(&mut self, player: &Player, total_time: f32) {
        self.position = player.position;
        self.direction = player.facing();
        self.current_radius = breathing_radius(self.base_radius, total_time);
    }
}

/// Sinusoidal breathing around the base radius
pub fn breathing_radius(base_radius: f32, total_time: f32) -> f32 {
    base_radius + (total_time * BREATHING_SPEED).sin() * BREATHING_MAGNITUDE
}
