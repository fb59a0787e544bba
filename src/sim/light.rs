//! Radial light sources
//!
//! Omnidirectional point lights with bounded radius that drift across the
//! grid and reflect elastically off its boundaries. Read-only inputs to the
//! lighting engine each frame.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{LIGHT_LEVELS, LIGHT_MOVE_SPEED};
use crate::sim::grid::HeightLevel;

/// An omnidirectional light. `height` is the emission height: cells taller
/// than it occlude the light, so high-flying lights shine over walls.
#[derive(Debug, Clone, Copy)]
pub struct RadialLight {
    pub position: Vec2,
    pub intensity: f32,
    pub radius: f32,
    pub velocity: Vec2,
    pub height: i32,
}

/// Scatter `count` lights uniformly over the grid with randomized intensity,
/// radius, and emission height between ceiling and full overhead.
pub fn create_radial_lights(rng: &mut Pcg32, count: u32, width: u32, height: u32) -> Vec<RadialLight> {
    let mut lights = Vec::with_capacity(count as usize);
    for _ in 0..count {
        lights.push(RadialLight {
            position: Vec2::new(
                rng.random_range(0.0..(width.max(2) - 1) as f32),
                rng.random_range(0.0..(height.max(2) - 1) as f32),
            ),
            intensity: rng.random_range(1..=LIGHT_LEVELS) as f32,
            radius: rng.random_range(10.0..30.0),
            velocity: Vec2::new(1.0, 0.5),
            height: rng.random_range(HeightLevel::Ceiling.level()..=HeightLevel::Radial.level()),
        });
    }
    lights
}

/// Advance every light and bounce it off the grid boundary
pub fn update_radial_lights(lights: &mut [RadialLight], width: u32, height: u32, dt: f32) {
    for light in lights {
        light.position += light.velocity * LIGHT_MOVE_SPEED * dt;

        let max_x = width as f32 - 0.01;
        let max_y = height as f32 - 0.01;
        if light.position.x < 0.0 || light.position.x >= width as f32 {
            light.velocity.x = -light.velocity.x;
            light.position.x = light.position.x.clamp(0.0, max_x);
        }
        if light.position.y < 0.0 || light.position.y >= height as f32 {
            light.velocity.y = -light.velocity.y;
            light.position.y = light.position.y.clamp(0.0, max_y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_lights_spawn_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let lights = create_radial_lights(&mut rng, 10, 50, 40);
        assert_eq!(lights.len(), 10);
        for light in &lights {
            assert!(light.position.x >= 0.0 && light.position.x < 50.0);
            assert!(light.position.y >= 0.0 && light.position.y < 40.0);
            assert!(light.intensity >= 1.0 && light.intensity <= LIGHT_LEVELS as f32);
            assert!(light.height >= HeightLevel::Ceiling.level());
            assert!(light.height <= HeightLevel::Radial.level());
        }
    }

    #[test]
    fn test_light_bounces_off_right_edge() {
        let mut lights = vec![RadialLight {
            position: Vec2::new(9.9, 5.0),
            intensity: 3.0,
            radius: 10.0,
            velocity: Vec2::new(1.0, 0.0),
            height: 50,
        }];
        update_radial_lights(&mut lights, 10, 10, 0.1);
        assert!(lights[0].velocity.x < 0.0);
        assert!(lights[0].position.x < 10.0);
    }

    #[test]
    fn test_light_bounces_off_top_edge() {
        let mut lights = vec![RadialLight {
            position: Vec2::new(5.0, 0.05),
            intensity: 3.0,
            radius: 10.0,
            velocity: Vec2::new(0.0, -1.0),
            height: 50,
        }];
        update_radial_lights(&mut lights, 10, 10, 0.1);
        assert!(lights[0].velocity.y > 0.0);
        assert!(lights[0].position.y >= 0.0);
    }
}
