//! Gridfire - a top-down tactical simulation on a destructible tile grid
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, ray casting, bullets, destruction)
//! - `lighting`: Per-cell light field computation (GPU compute with CPU fallback)
//! - `render`: Per-cell output projections for an external renderer
//! - `audio`: Fire-and-forget sound cue seam
//! - `config`: Session-fixed world generation parameters

pub mod audio;
pub mod config;
pub mod lighting;
pub mod render;
pub mod sim;

pub use audio::{AudioCue, AudioSink, NullAudio};
pub use config::WorldConfig;
pub use lighting::{BackendChoice, LightingEngine, LightingError, apply_lighting};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default grid dimensions (cells)
    pub const GRID_WIDTH: u32 = 150;
    pub const GRID_HEIGHT: u32 = 150;
    /// Cell edge length in pixels (for the external renderer)
    pub const CELL_SIZE: u32 = 6;

    /// Ambient light floor; no cell ever shades fully black
    pub const AMBIENT_LIGHT: f32 = 0.1;
    /// Discrete light levels; a cell's light_level is in [0, LIGHT_LEVELS]
    pub const LIGHT_LEVELS: i32 = 5;
    /// Hard cap on simultaneous radial lights (sizes the GPU light buffer)
    pub const MAX_RADIAL_LIGHTS: usize = 10;

    /// Torch geometry
    pub const TORCH_RADIUS: f32 = 18.0;
    /// Cone half-angle in degrees; a cell is lit when its direction is
    /// within this angle of the torch facing
    pub const TORCH_HALF_ANGLE_DEG: f32 = 60.0;
    /// Breathing oscillation of the torch radius
    pub const BREATHING_SPEED: f32 = 2.0;
    pub const BREATHING_MAGNITUDE: f32 = 3.0;
    /// Grid-cells-per-second multiplier on radial light velocity
    pub const LIGHT_MOVE_SPEED: f32 = 5.0;

    /// Player movement
    pub const PLAYER_TURN_SPEED: f32 = 0.07;
    pub const PLAYER_ACCELERATION: f32 = 0.05;
    pub const PLAYER_MAX_SPEED: f32 = 0.3;
    pub const PLAYER_FRICTION: f32 = 0.1;

    /// Bullets (cells per tick, ticks)
    pub const BULLET_SPEED: f32 = 10.0;
    pub const BULLET_LIFETIME: i32 = 60;
    pub const BULLET_COOLDOWN: i32 = 8;
    /// Particles spawned at every terrain hit
    pub const PARTICLES_PER_HIT: u32 = 30;
}

/// Normalize angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for a heading in radians
#[inline]
pub fn heading_to_dir(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_heading_to_dir_unit() {
        let d = heading_to_dir(1.234);
        assert!((d.length() - 1.0).abs() < 1e-6);
    }
}
