//! CPU reference evaluator
//!
//! Scalar implementation of the per-cell, per-light kernel. This is the
//! numeric ground truth: the GPU path mirrors these operations one for one,
//! and every lighting test pins behavior against this module.

use glam::{IVec2, Vec2};

use crate::consts::{LIGHT_LEVELS, MAX_RADIAL_LIGHTS};
use crate::sim::grid::Grid;
use crate::sim::light::RadialLight;
use crate::sim::player::Torch;

/// Walk the digital line from the source cell toward the target cell and
/// report whether any strictly-intermediate cell rises above the source's
/// emission height. Endpoints never occlude themselves.
fn occluded(grid: &Grid, src: IVec2, dst: IVec2, src_height: i32) -> bool {
    let dx = (dst.x - src.x).abs();
    let dy = (dst.y - src.y).abs();
    let x_inc = if dst.x > src.x { 1 } else { -1 };
    let y_inc = if dst.y > src.y { 1 } else { -1 };
    let mut x = src.x;
    let mut y = src.y;
    let mut error = dx - dy;
    let mut n = dx + dy;

    while n > 0 {
        if error > 0 {
            x += x_inc;
            error -= dy * 2;
        } else {
            y += y_inc;
            error += dx * 2;
        }
        n -= 1;
        if x == dst.x && y == dst.y {
            break;
        }
        if grid.get(x, y).height.level() > src_height {
            return true;
        }
    }

    false
}

/// One radial light's contribution at a cell, occlusion included
fn radial_contribution(grid: &Grid, light: &RadialLight, cell: IVec2, cell_pos: Vec2) -> f32 {
    let dist = cell_pos.distance(light.position);
    if dist >= light.radius {
        return 0.0;
    }
    let src = IVec2::new(light.position.x as i32, light.position.y as i32);
    if occluded(grid, src, cell, light.height) {
        return 0.0;
    }
    light.intensity * (1.0 - dist / light.radius)
}

/// The torch cone's contribution at a cell.
///
/// Lit only within `current_radius` and within `cos_half_angle` of the
/// facing direction; the cell holding the torch itself is always inside
/// the cone. Intensity falls off linearly to the breathing radius.
fn torch_contribution(
    grid: &Grid,
    torch: &Torch,
    cos_half_angle: f32,
    torch_height: i32,
    cell: IVec2,
    cell_pos: Vec2,
) -> f32 {
    let to_cell = cell_pos - torch.position;
    let dist = to_cell.length();
    if dist >= torch.current_radius {
        return 0.0;
    }
    if dist > 0.0 {
        let cos_angle = to_cell.dot(torch.direction) / dist;
        if cos_angle < cos_half_angle {
            return 0.0;
        }
    }
    let src = IVec2::new(torch.position.x as i32, torch.position.y as i32);
    if occluded(grid, src, cell, torch_height) {
        return 0.0;
    }
    LIGHT_LEVELS as f32 * (1.0 - dist / torch.current_radius)
}

/// Evaluate the full light field into `out` (row-major, one level per cell).
///
/// Reads only the grid's heights; contributions accumulate and the sum is
/// clamped to `[0, LIGHT_LEVELS]` then truncated. At most `MAX_RADIAL_LIGHTS`
/// entries of `lights` are consulted, the same cap the device light buffer
/// enforces, so both backends see the same sources.
pub fn evaluate(
    grid: &Grid,
    lights: &[RadialLight],
    torch: &Torch,
    torch_on: bool,
    out: &mut [i32],
) {
    debug_assert_eq!(out.len(), (grid.width() * grid.height()) as usize);
    let lights = &lights[..lights.len().min(MAX_RADIAL_LIGHTS)];
    let cos_half_angle = crate::consts::TORCH_HALF_ANGLE_DEG.to_radians().cos();
    let torch_height = crate::sim::grid::HeightLevel::Torch.level();

    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let cell = IVec2::new(x, y);
            let cell_pos = Vec2::new(x as f32, y as f32);

            let mut sum = 0.0;
            for light in lights {
                sum += radial_contribution(grid, light, cell, cell_pos);
            }
            if torch_on {
                sum += torch_contribution(grid, torch, cos_half_angle, torch_height, cell, cell_pos);
            }

            out[(y as u32 * grid.width() + x as u32) as usize] =
                sum.clamp(0.0, LIGHT_LEVELS as f32) as i32;
        }
    }
}
