//! Height-field grid: the sole occlusion and collision surface
//!
//! Dense row-major array of cells, created once at world generation and
//! mutated in place by terrain destruction. Out-of-bounds reads are defined
//! to return a non-occluding floor cell, never to fail.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Ordinal occlusion thickness of a cell. Higher levels block more light
/// and stop bullets; only `Floor` lets rays pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightLevel {
    Floor,
    Block1,
    Block2,
    Block3,
    Box,
    Player,
    Torch,
    Bullet,
    Ceiling,
    Wall,
    Radial,
}

impl HeightLevel {
    /// Occlusion thickness. `Block3`/`Box` and `Block2`/`Player` share a
    /// level on purpose.
    pub const fn level(self) -> i32 {
        match self {
            HeightLevel::Floor => 1,
            HeightLevel::Block1 => 5,
            HeightLevel::Block2 | HeightLevel::Player => 10,
            HeightLevel::Block3 | HeightLevel::Box => 15,
            HeightLevel::Bullet => 25,
            HeightLevel::Torch => 30,
            HeightLevel::Ceiling => 40,
            HeightLevel::Wall => 49,
            HeightLevel::Radial => 50,
        }
    }

    /// Whether this cell stops bullets and occludes light
    pub const fn blocks(self) -> bool {
        self.level() > HeightLevel::Floor.level()
    }

    /// Base color lookup; a cell's color is a pure function of its height
    pub const fn base_color(self) -> Rgba {
        match self {
            HeightLevel::Floor => Rgba::new(50, 50, 50),
            HeightLevel::Block1 | HeightLevel::Wall => Rgba::new(150, 150, 150),
            HeightLevel::Block2 => Rgba::new(180, 180, 180),
            HeightLevel::Block3 => Rgba::new(210, 210, 210),
            _ => Rgba::new(200, 200, 200),
        }
    }
}

/// Opaque 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Normalized float color for GPU-side consumers
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

/// A single grid cell. `light_level` is re-derived every frame by the
/// lighting engine and carries no meaning across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub height: HeightLevel,
    pub light_level: i32,
    pub base_color: Rgba,
}

impl Cell {
    pub const fn floor() -> Self {
        Self {
            height: HeightLevel::Floor,
            light_level: 0,
            base_color: HeightLevel::Floor.base_color(),
        }
    }
}

/// Dense row-major height field. Never resized after creation.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    width: u32,
    height: u32,
    /// Bumped on every terrain mutation; device-side height mirrors
    /// re-upload only when this moves.
    generation: u64,
}

impl Grid {
    /// All-floor grid
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![Cell::floor(); (width * height) as usize],
            width,
            height,
            generation: 0,
        }
    }

    /// Generate a world: all floor plus `clusters` square box obstacles of
    /// `cluster_size` cells at distinct origins, clipped to bounds.
    pub fn generate(width: u32, height: u32, clusters: u32, cluster_size: u32, seed: u64) -> Self {
        let mut grid = Self::new(width, height);
        let mut rng = Pcg32::seed_from_u64(seed);
        // Distinct origins cannot exceed the cell count; an oversized request
        // (config is arbitrary JSON) would otherwise reject forever
        let clusters = clusters.min(width * height);
        let mut origins: Vec<(u32, u32)> = Vec::with_capacity(clusters as usize);

        for _ in 0..clusters {
            let (sx, sy) = loop {
                let sx = rng.random_range(0..width);
                let sy = rng.random_range(0..height);
                if !origins.contains(&(sx, sy)) {
                    break (sx, sy);
                }
            };
            origins.push((sx, sy));

            for y in sy..(sy + cluster_size).min(height) {
                for x in sx..(sx + cluster_size).min(width) {
                    grid.set_height(x as i32, y as i32, HeightLevel::Box);
                }
            }
        }

        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as u32) < self.width && y >= 0 && (y as u32) < self.height
    }

    /// Cell at (x, y); out-of-bounds coordinates yield a default floor cell
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Cell {
        if self.in_bounds(x, y) {
            self.cells[(y as u32 * self.width + x as u32) as usize]
        } else {
            Cell::floor()
        }
    }

    /// Set a cell's height and recolor it via the height lookup.
    /// Out-of-bounds writes are ignored.
    pub fn set_height(&mut self, x: i32, y: i32, height: HeightLevel) {
        if self.in_bounds(x, y) {
            let cell = &mut self.cells[(y as u32 * self.width + x as u32) as usize];
            cell.height = height;
            cell.base_color = height.base_color();
            self.generation += 1;
        }
    }

    /// Overwrite the whole light field (one value per cell, row-major)
    pub(crate) fn store_light_levels(&mut self, levels: &[i32]) {
        debug_assert_eq!(levels.len(), self.cells.len());
        for (cell, &level) in self.cells.iter_mut().zip(levels) {
            cell.light_level = level;
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Height levels as raw ordinals, row-major (GPU upload form)
    pub fn height_levels(&self) -> Vec<i32> {
        self.cells.iter().map(|c| c.height.level()).collect()
    }
}
