//! Impact particles
//!
//! Purely cosmetic: spawned at a hit point, biased along the hit normal,
//! geometric velocity decay, gone at end of life. Nothing else reads them.

use std::f32::consts::PI;

use glam::{IVec2, Vec2};
use rand::Rng;
use rand_pcg::Pcg32;

use crate::sim::grid::Rgba;

#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub lifetime: i32,
    pub color: Rgba,
    /// Velocity multiplier applied each tick
    pub velocity_decay: f32,
}

/// Angular spread around the hit normal
const SPREAD: f32 = PI / 25.0;

/// Spawn `count` particles at `origin`, scattered in a narrow cone around
/// the outward hit normal with randomized speed and lifetime.
pub fn spawn_burst(
    particles: &mut Vec<Particle>,
    rng: &mut Pcg32,
    origin: Vec2,
    normal: IVec2,
    count: u32,
) {
    let base_angle = (normal.y as f32).atan2(normal.x as f32);
    for _ in 0..count {
        let angle = base_angle + rng.random_range(-SPREAD..SPREAD);
        let speed = rng.random_range(0.5..2.5);
        particles.push(Particle {
            position: origin,
            velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
            lifetime: rng.random_range(10..=25),
            color: Rgba::new(255, 255, 255),
            velocity_decay: 0.7,
        });
    }
}

/// Advance all particles one tick and drop the expired ones
pub fn update_particles(particles: &mut Vec<Particle>) {
    for p in particles.iter_mut() {
        p.position += p.velocity;
        p.velocity *= p.velocity_decay;
        p.lifetime -= 1;
    }
    particles.retain(|p| p.lifetime > 0);
}
