//! Session configuration
//!
//! World generation parameters, fixed for the life of a session. Loaded
//! from a JSON file when one is supplied; any missing or unreadable file
//! falls back to defaults with a log line rather than an error.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::lighting::BackendChoice;

/// Torch tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TorchConfig {
    pub base_radius: f32,
}

impl Default for TorchConfig {
    fn default() -> Self {
        Self {
            base_radius: consts::TORCH_RADIUS,
        }
    }
}

/// World generation and backend parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    /// Cell edge length in pixels, for the renderer's viewport math
    pub cell_size: u32,
    /// Number of square obstacle clusters scattered at generation
    pub obstacle_clusters: u32,
    /// Edge length of each cluster in cells
    pub cluster_size: u32,
    /// Radial lights created at session start
    pub light_count: u32,
    pub torch: TorchConfig,
    pub backend: BackendChoice,
    /// World generation and particle RNG seed
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_width: consts::GRID_WIDTH,
            grid_height: consts::GRID_HEIGHT,
            cell_size: consts::CELL_SIZE,
            obstacle_clusters: 380,
            cluster_size: 10,
            light_count: consts::MAX_RADIAL_LIGHTS as u32,
            torch: TorchConfig::default(),
            backend: BackendChoice::default(),
            seed: 0,
        }
    }
}

impl WorldConfig {
    /// Load from a JSON file; falls back to defaults when the file is
    /// missing or malformed.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => {
                    log::info!("loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("bad config {}: {err}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("cannot read {}: {err}, using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.grid_width, 150);
        assert_eq!(config.grid_height, 150);
        assert_eq!(config.obstacle_clusters, 380);
        assert_eq!(config.cluster_size, 10);
        assert_eq!(config.backend, BackendChoice::Auto);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{"grid_width": 64, "backend": "cpu"}"#).unwrap();
        assert_eq!(config.grid_width, 64);
        assert_eq!(config.grid_height, 150);
        assert_eq!(config.backend, BackendChoice::Cpu);
        assert_eq!(config.torch.base_radius, consts::TORCH_RADIUS);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = WorldConfig::load(Path::new("/nonexistent/gridfire.json"));
        assert_eq!(config.grid_width, 150);
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = WorldConfig {
            seed: 99,
            light_count: 3,
            ..WorldConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        let back: WorldConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.seed, 99);
        assert_eq!(back.light_count, 3);
    }
}
