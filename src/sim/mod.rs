//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod bullet;
pub mod grid;
pub mod light;
pub mod particle;
pub mod player;
pub mod raycast;
pub mod state;
pub mod tick;

pub use bullet::{Bullet, apply_hit, fire, hit_normal, update_bullets};
pub use grid::{Cell, Grid, HeightLevel, Rgba};
pub use light::{RadialLight, create_radial_lights, update_radial_lights};
pub use particle::{Particle, spawn_burst, update_particles};
pub use player::{Player, Torch, breathing_radius};
pub use raycast::cast;
pub use state::{TickInput, WorldState};
pub use tick::tick;
