//! World state and per-tick input
//!
//! Everything the simulation owns lives here. State is built once from a
//! `WorldConfig` and mutated in place for the life of the session.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::WorldConfig;
use crate::consts::{MAX_RADIAL_LIGHTS, SIM_DT};
use crate::sim::bullet::Bullet;
use crate::sim::grid::Grid;
use crate::sim::light::{self, RadialLight};
use crate::sim::particle::Particle;
use crate::sim::player::{Player, Torch};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement axes, each in [-1, 1]
    pub move_axis: Vec2,
    /// Aim target in grid coordinates (crosshair position)
    pub aim: Option<Vec2>,
    /// Fire trigger; edge-triggered while the cooldown is zero
    pub fire: bool,
    /// Torch on/off toggle (edge-triggered)
    pub toggle_torch: bool,
}

/// Complete simulation state
#[derive(Debug)]
pub struct WorldState {
    pub grid: Grid,
    pub player: Player,
    pub torch: Torch,
    pub torch_on: bool,
    pub lights: Vec<RadialLight>,
    pub bullets: Vec<Bullet>,
    pub particles: Vec<Particle>,
    /// Seeded RNG for particle scatter
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl WorldState {
    /// Build a world from session parameters
    pub fn new(config: &WorldConfig) -> Self {
        let grid = Grid::generate(
            config.grid_width,
            config.grid_height,
            config.obstacle_clusters,
            config.cluster_size,
            config.seed,
        );
        let mut rng = Pcg32::seed_from_u64(config.seed ^ 0x9e37_79b9_7f4a_7c15);
        // The light buffer holds at most MAX_RADIAL_LIGHTS on either backend
        let lights = light::create_radial_lights(
            &mut rng,
            config.light_count.min(MAX_RADIAL_LIGHTS as u32),
            config.grid_width,
            config.grid_height,
        );
        let center = Vec2::new(
            config.grid_width as f32 / 2.0,
            config.grid_height as f32 / 2.0,
        );
        let player = Player::new(center);
        let torch = Torch::new(center, config.torch.base_radius);

        Self {
            grid,
            player,
            torch,
            torch_on: true,
            lights,
            bullets: Vec::new(),
            particles: Vec::new(),
            rng,
            time_ticks: 0,
        }
    }

    /// Seconds since session start, derived from the tick counter
    pub fn total_time(&self) -> f32 {
        self.time_ticks as f32 * SIM_DT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_from_config() {
        let config = WorldConfig {
            grid_width: 40,
            grid_height: 30,
            light_count: 4,
            obstacle_clusters: 6,
            cluster_size: 3,
            ..WorldConfig::default()
        };
        let state = WorldState::new(&config);
        assert_eq!(state.grid.width(), 40);
        assert_eq!(state.grid.height(), 30);
        assert_eq!(state.lights.len(), 4);
        assert!(state.torch_on);
        assert_eq!(state.player.position, Vec2::new(20.0, 15.0));
    }

    #[test]
    fn test_light_count_is_capped() {
        let config = WorldConfig {
            light_count: 64,
            ..WorldConfig::default()
        };
        let state = WorldState::new(&config);
        assert_eq!(state.lights.len(), MAX_RADIAL_LIGHTS);
    }

    #[test]
    fn test_same_seed_same_world() {
        let config = WorldConfig::default();
        let a = WorldState::new(&config);
        let b = WorldState::new(&config);
        assert_eq!(a.grid.height_levels(), b.grid.height_levels());
        for (la, lb) in a.lights.iter().zip(&b.lights) {
            assert_eq!(la.position, lb.position);
            assert_eq!(la.intensity, lb.intensity);
        }
    }
}
