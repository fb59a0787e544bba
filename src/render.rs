//! Per-cell output projection
//!
//! Turns simulation state into flat instance lists an external renderer can
//! upload directly. The shading here is the final say on cell color: base
//! color modulated by the frame's light level, nothing else.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::lighting::apply_lighting;
use crate::sim::grid::Grid;
use crate::sim::particle::Particle;

/// One shaded cell, ready for an instanced quad draw
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CellInstance {
    /// Cell center in normalized device coordinates
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl CellInstance {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CellInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Map a grid-space point to NDC. Grid y grows downward, NDC y grows up.
pub fn grid_to_ndc(pos: Vec2, grid_width: u32, grid_height: u32) -> [f32; 2] {
    [
        (pos.x + 0.5) / grid_width as f32 * 2.0 - 1.0,
        1.0 - (pos.y + 0.5) / grid_height as f32 * 2.0,
    ]
}

/// Shade every cell for the current frame, row-major
pub fn build_cell_instances(grid: &Grid) -> Vec<CellInstance> {
    let mut instances = Vec::with_capacity(grid.cells().len());
    for (i, cell) in grid.cells().iter().enumerate() {
        let x = (i as u32 % grid.width()) as f32;
        let y = (i as u32 / grid.width()) as f32;
        let shaded = apply_lighting(cell.base_color, cell.light_level);
        instances.push(CellInstance {
            position: grid_to_ndc(Vec2::new(x, y), grid.width(), grid.height()),
            color: shaded.to_f32(),
        });
    }
    instances
}

/// Project live particles on top of the cell layer
pub fn build_particle_instances(
    particles: &[Particle],
    grid_width: u32,
    grid_height: u32,
) -> Vec<CellInstance> {
    particles
        .iter()
        .map(|p| CellInstance {
            position: grid_to_ndc(p.position, grid_width, grid_height),
            color: p.color.to_f32(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::LIGHT_LEVELS;
    use crate::sim::grid::HeightLevel;

    #[test]
    fn test_one_instance_per_cell() {
        let grid = Grid::new(12, 9);
        let instances = build_cell_instances(&grid);
        assert_eq!(instances.len(), 12 * 9);
    }

    #[test]
    fn test_ndc_corners() {
        // Cell centers sit half a cell in from the NDC extremes
        let [x, y] = grid_to_ndc(Vec2::new(0.0, 0.0), 10, 10);
        assert!((x - -0.9).abs() < 1e-6);
        assert!((y - 0.9).abs() < 1e-6);
        let [x, y] = grid_to_ndc(Vec2::new(9.0, 9.0), 10, 10);
        assert!((x - 0.9).abs() < 1e-6);
        assert!((y - -0.9).abs() < 1e-6);
    }

    #[test]
    fn test_unlit_cells_keep_ambient_floor() {
        let grid = Grid::new(4, 4);
        let instances = build_cell_instances(&grid);
        let base = HeightLevel::Floor.base_color();
        let expected = apply_lighting(base, 0).to_f32();
        assert_eq!(instances[0].color, expected);
        // Never fully black
        assert!(instances[0].color[0] > 0.0);
    }

    #[test]
    fn test_lit_cell_shows_base_color() {
        let mut grid = Grid::new(4, 4);
        grid.store_light_levels(&vec![LIGHT_LEVELS; 16]);
        let instances = build_cell_instances(&grid);
        assert_eq!(instances[5].color, HeightLevel::Floor.base_color().to_f32());
    }
}
