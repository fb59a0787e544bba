//! Per-frame lighting engine
//!
//! Recomputes the whole light field from the grid's height levels every
//! tick. Two interchangeable backends: a WebGPU compute kernel and a scalar
//! CPU evaluator. Both run the same per-cell arithmetic, so a world produces
//! identical integer light levels on either path.

pub mod cpu;
pub mod gpu;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{AMBIENT_LIGHT, LIGHT_LEVELS};
use crate::sim::grid::{Grid, Rgba};
use crate::sim::light::RadialLight;
use crate::sim::player::Torch;

/// Backend selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Prefer the GPU, fall back to the CPU if no adapter is available
    #[default]
    Auto,
    /// GPU only; engine construction fails without one
    Gpu,
    /// CPU only
    Cpu,
}

#[derive(Debug, Error)]
pub enum LightingError {
    /// Backend could not be brought up at all
    #[error("lighting backend init failed: {0}")]
    Init(String),
    /// A single frame's compute or readback failed
    #[error("lighting frame failed: {0}")]
    Frame(String),
}

enum Backend {
    Cpu,
    Gpu(gpu::GpuEvaluator),
    /// Fails every frame; exercises the transient-failure contract
    #[cfg(test)]
    Broken,
}

/// Owns the backend and a host-side scratch field for the results
pub struct LightingEngine {
    backend: Backend,
    levels: Vec<i32>,
}

impl LightingEngine {
    /// Bring up a backend for a `width` x `height` field.
    ///
    /// `Auto` degrades to the CPU path with a warning when no GPU adapter
    /// can be acquired; `Gpu` makes that condition an error instead.
    pub fn new(choice: BackendChoice, width: u32, height: u32) -> Result<Self, LightingError> {
        let backend = match choice {
            BackendChoice::Cpu => Backend::Cpu,
            BackendChoice::Gpu => Backend::Gpu(gpu::GpuEvaluator::new(width, height)?),
            BackendChoice::Auto => match gpu::GpuEvaluator::new(width, height) {
                Ok(eval) => Backend::Gpu(eval),
                Err(err) => {
                    log::warn!("GPU lighting unavailable, falling back to CPU: {err}");
                    Backend::Cpu
                }
            },
        };
        Ok(Self {
            backend,
            levels: vec![0; (width * height) as usize],
        })
    }

    /// Engine whose every frame fails with `LightingError::Frame`
    #[cfg(test)]
    pub(crate) fn broken(width: u32, height: u32) -> Self {
        Self {
            backend: Backend::Broken,
            levels: vec![0; (width * height) as usize],
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Cpu => "cpu",
            Backend::Gpu(_) => "gpu",
            #[cfg(test)]
            Backend::Broken => "broken",
        }
    }

    /// Recompute the light field for the current frame and write it into
    /// the grid's cells. On a frame error nothing is written, so the cells
    /// keep the previous frame's levels.
    pub fn compute(
        &mut self,
        grid: &mut Grid,
        lights: &[RadialLight],
        torch: &Torch,
        torch_on: bool,
    ) -> Result<(), LightingError> {
        self.levels.resize((grid.width() * grid.height()) as usize, 0);
        match &mut self.backend {
            Backend::Cpu => cpu::evaluate(grid, lights, torch, torch_on, &mut self.levels),
            Backend::Gpu(eval) => eval.evaluate(grid, lights, torch, torch_on, &mut self.levels)?,
            #[cfg(test)]
            Backend::Broken => return Err(LightingError::Frame("backend out of service".into())),
        }
        grid.store_light_levels(&self.levels);
        Ok(())
    }

    /// Most recent light field, row-major
    pub fn light_levels(&self) -> &[i32] {
        &self.levels
    }
}

/// Shade a cell's base color by its discrete light level.
///
/// Level 0 leaves the ambient floor; the top level restores the base color
/// exactly. Channels round to the nearest integer and alpha stays opaque.
pub fn apply_lighting(base: Rgba, level: i32) -> Rgba {
    let level = level.clamp(0, LIGHT_LEVELS);
    let lum = AMBIENT_LIGHT + (1.0 - AMBIENT_LIGHT) * level as f32 / LIGHT_LEVELS as f32;
    let shade = |c: u8| (f32::from(c) * lum).round() as u8;
    Rgba {
        r: shade(base.r),
        g: shade(base.g),
        b: shade(base.b),
        a: 255,
    }
}
