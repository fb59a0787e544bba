//! Grid-aligned ray casting
//!
//! Digital-line traversal that visits every cell a segment passes through,
//! in order, without skipping diagonally-adjacent cells at corners. Shared
//! by bullet collision and player movement; the lighting kernels walk the
//! same line for occlusion so all three agree on what a ray can see.

use glam::{IVec2, Vec2};

use super::grid::Grid;

/// Cast a ray from `start` to `end` (grid-cell coordinates).
///
/// Returns the first in-bounds blocking cell on the segment, or `None` if
/// the traversal exhausts its step budget (`1 + |dx| + |dy|`) without a hit.
/// A zero-length segment hits only when the start cell itself blocks.
pub fn cast(grid: &Grid, start: Vec2, end: Vec2) -> Option<IVec2> {
    let mut dx = (end.x - start.x).abs();
    let mut dy = (end.y - start.y).abs();
    let mut x = start.x as i32;
    let mut y = start.y as i32;
    let mut n = 1 + (dx + dy) as i32;
    let x_inc = if end.x > start.x { 1 } else { -1 };
    let y_inc = if end.y > start.y { 1 } else { -1 };
    // Doubled error term; positive means the horizontal step is due
    let mut error = dx - dy;
    dx *= 2.0;
    dy *= 2.0;

    while n > 0 {
        if grid.in_bounds(x, y) && grid.get(x, y).height.blocks() {
            return Some(IVec2::new(x, y));
        }

        if error > 0.0 {
            x += x_inc;
            error -= dy;
        } else {
            y += y_inc;
            error += dx;
        }
        n -= 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::HeightLevel;
    use proptest::prelude::*;

    fn grid_with_wall(x: i32, y: i32) -> Grid {
        let mut grid = Grid::new(10, 10);
        grid.set_height(x, y, HeightLevel::Wall);
        grid
    }

    #[test]
    fn test_horizontal_ray_hits_single_wall_exactly() {
        let grid = grid_with_wall(5, 5);
        let hit = cast(&grid, Vec2::new(0.0, 5.0), Vec2::new(9.0, 5.0));
        assert_eq!(hit, Some(IVec2::new(5, 5)));
    }

    #[test]
    fn test_vertical_ray_hits_single_wall_exactly() {
        let grid = grid_with_wall(3, 7);
        let hit = cast(&grid, Vec2::new(3.0, 0.0), Vec2::new(3.0, 9.0));
        assert_eq!(hit, Some(IVec2::new(3, 7)));
    }

    #[test]
    fn test_clear_path_misses() {
        let grid = Grid::new(10, 10);
        assert_eq!(cast(&grid, Vec2::new(0.0, 0.0), Vec2::new(9.0, 9.0)), None);
    }

    #[test]
    fn test_zero_length_segment_on_floor_misses() {
        let grid = Grid::new(10, 10);
        assert_eq!(cast(&grid, Vec2::new(4.0, 4.0), Vec2::new(4.0, 4.0)), None);
    }

    #[test]
    fn test_zero_length_segment_inside_wall_hits() {
        let grid = grid_with_wall(4, 4);
        let hit = cast(&grid, Vec2::new(4.5, 4.5), Vec2::new(4.5, 4.5));
        assert_eq!(hit, Some(IVec2::new(4, 4)));
    }

    #[test]
    fn test_ray_stops_at_first_wall() {
        let mut grid = Grid::new(10, 10);
        grid.set_height(4, 5, HeightLevel::Wall);
        grid.set_height(7, 5, HeightLevel::Wall);
        let hit = cast(&grid, Vec2::new(0.0, 5.0), Vec2::new(9.0, 5.0));
        assert_eq!(hit, Some(IVec2::new(4, 5)));
    }

    #[test]
    fn test_ray_respects_step_budget() {
        // Wall beyond the segment end is never reached
        let grid = grid_with_wall(8, 5);
        assert_eq!(cast(&grid, Vec2::new(0.0, 5.0), Vec2::new(4.0, 5.0)), None);
    }

    #[test]
    fn test_out_of_bounds_traversal_is_safe() {
        let grid = Grid::new(10, 10);
        assert_eq!(
            cast(&grid, Vec2::new(-5.0, -5.0), Vec2::new(15.0, 15.0)),
            None
        );
    }

    proptest! {
        #[test]
        fn prop_cast_is_deterministic(
            sx in -5.0f32..15.0, sy in -5.0f32..15.0,
            ex in -5.0f32..15.0, ey in -5.0f32..15.0,
            wx in 0i32..10, wy in 0i32..10,
        ) {
            let grid = grid_with_wall(wx, wy);
            let a = cast(&grid, Vec2::new(sx, sy), Vec2::new(ex, ey));
            let b = cast(&grid, Vec2::new(sx, sy), Vec2::new(ex, ey));
            prop_assert_eq!(a, b);
        }
    }
}
