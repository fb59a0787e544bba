//! Bullets and collision-driven terrain destruction
//!
//! Each tick a bullet ray-casts the segment it travels; the first blocking
//! cell is lowered to floor, a particle burst is spawned along the hit
//! normal, and the bullet is retired. Destruction is committed before the
//! frame's lighting pass reads the height field, so the light never lags
//! the terrain.

use glam::{IVec2, Vec2};
use rand_pcg::Pcg32;

use crate::audio::{AudioCue, AudioSink};
use crate::consts::*;
use crate::sim::grid::{Grid, HeightLevel};
use crate::sim::particle::{self, Particle};
use crate::sim::player::Player;
use crate::sim::raycast;

/// An in-flight bullet, exclusively owned by the active-bullets list
#[derive(Debug, Clone, Copy)]
pub struct Bullet {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Ticks remaining before the bullet expires
    pub lifetime: i32,
}

/// Fire a bullet from the player if the cooldown allows it.
///
/// Arms the cooldown and emits a fire cue; the cooldown itself counts down
/// in the player update.
pub fn fire(bullets: &mut Vec<Bullet>, player: &mut Player, audio: &mut dyn AudioSink) {
    if player.cooldown != 0 {
        return;
    }
    audio.play(AudioCue::Fire);
    bullets.push(Bullet {
        position: player.position,
        velocity: player.facing() * BULLET_SPEED,
        lifetime: BULLET_LIFETIME,
    });
    player.cooldown = BULLET_COOLDOWN;
}

/// Which face of the hit cell the ray struck, as an outward normal.
///
/// The larger displacement axis picks the face: |dx| > |dy| means a
/// vertical face was hit (normal ±x), ties and the rest fall to a
/// horizontal face (normal ±y). The sign opposes the direction of travel.
pub fn hit_normal(start: Vec2, hit: IVec2) -> IVec2 {
    let dx = hit.x as f32 - start.x;
    let dy = hit.y as f32 - start.y;
    if dx.abs() > dy.abs() {
        IVec2::new(if dx > 0.0 { -1 } else { 1 }, 0)
    } else {
        IVec2::new(0, if dy > 0.0 { -1 } else { 1 })
    }
}

/// Lower the struck cell to floor and recolor it, returning the hit normal.
/// Applying a hit to an already-floor cell changes nothing.
pub fn apply_hit(grid: &mut Grid, start: Vec2, hit: IVec2) -> IVec2 {
    if grid.get(hit.x, hit.y).height != HeightLevel::Floor {
        grid.set_height(hit.x, hit.y, HeightLevel::Floor);
    }
    hit_normal(start, hit)
}

/// Advance every bullet one tick.
///
/// On a terrain hit: particle burst, destruction, impact cue, bullet gone.
/// Otherwise the bullet moves, ages, and is retired at end of life or on
/// leaving the grid.
pub fn update_bullets(
    bullets: &mut Vec<Bullet>,
    particles: &mut Vec<Particle>,
    grid: &mut Grid,
    rng: &mut Pcg32,
    audio: &mut dyn AudioSink,
) {
    let mut i = 0;
    while i < bullets.len() {
        let start = bullets[i].position;
        let end = start + bullets[i].velocity;

        if let Some(hit) = raycast::cast(grid, start, end) {
            audio.play(AudioCue::Impact);
            let normal = apply_hit(grid, start, hit);
            particle::spawn_burst(
                particles,
                rng,
                Vec2::new(hit.x as f32, hit.y as f32),
                normal,
                PARTICLES_PER_HIT,
            );
            bullets.swap_remove(i);
            continue;
        }

        let bullet = &mut bullets[i];
        bullet.position = end;
        bullet.lifetime -= 1;

        let out_of_bounds = bullet.position.x < 0.0
            || bullet.position.x >= grid.width() as f32
            || bullet.position.y < 0.0
            || bullet.position.y >= grid.height() as f32;
        if bullet.lifetime <= 0 || out_of_bounds {
            bullets.swap_remove(i);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use rand::SeedableRng;

    fn test_rng() -> Pcg32 {
        Pcg32::seed_from_u64(99)
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut bullets = Vec::new();
        let mut player = Player::new(Vec2::new(5.0, 5.0));
        let mut audio = NullAudio;

        fire(&mut bullets, &mut player, &mut audio);
        assert_eq!(bullets.len(), 1);
        assert_eq!(player.cooldown, BULLET_COOLDOWN);
        assert_eq!(bullets[0].lifetime, BULLET_LIFETIME);
        assert!((bullets[0].velocity.length() - BULLET_SPEED).abs() < 1e-4);

        // Still cooling down: no second bullet
        fire(&mut bullets, &mut player, &mut audio);
        assert_eq!(bullets.len(), 1);
    }

    #[test]
    fn test_hit_normal_four_faces() {
        // Travelling +x hits the west face
        assert_eq!(hit_normal(Vec2::new(0.0, 5.0), IVec2::new(5, 5)), IVec2::new(-1, 0));
        // Travelling -x hits the east face
        assert_eq!(hit_normal(Vec2::new(9.0, 5.0), IVec2::new(5, 5)), IVec2::new(1, 0));
        // Travelling +y hits the north face
        assert_eq!(hit_normal(Vec2::new(5.0, 0.0), IVec2::new(5, 5)), IVec2::new(0, -1));
        // Travelling -y hits the south face
        assert_eq!(hit_normal(Vec2::new(5.0, 9.0), IVec2::new(5, 5)), IVec2::new(0, 1));
    }

    #[test]
    fn test_hit_normal_tie_breaks_to_horizontal_face() {
        // |dx| == |dy| falls to the y-axis normal
        assert_eq!(hit_normal(Vec2::new(0.0, 0.0), IVec2::new(4, 4)), IVec2::new(0, -1));
    }

    #[test]
    fn test_apply_hit_floors_cell() {
        let mut grid = Grid::new(10, 10);
        grid.set_height(5, 5, HeightLevel::Wall);
        let normal = apply_hit(&mut grid, Vec2::new(0.0, 5.0), IVec2::new(5, 5));
        assert_eq!(normal, IVec2::new(-1, 0));
        let cell = grid.get(5, 5);
        assert_eq!(cell.height, HeightLevel::Floor);
        assert_eq!(cell.base_color, HeightLevel::Floor.base_color());
    }

    #[test]
    fn test_apply_hit_is_idempotent_on_floor() {
        let mut grid = Grid::new(10, 10);
        let before = grid.get(3, 3);
        let generation = grid.generation();
        apply_hit(&mut grid, Vec2::new(0.0, 3.0), IVec2::new(3, 3));
        assert_eq!(grid.get(3, 3), before);
        assert_eq!(grid.generation(), generation);
    }

    #[test]
    fn test_bullet_expires_after_lifetime() {
        let mut grid = Grid::new(1000, 1000);
        let mut particles = Vec::new();
        let mut rng = test_rng();
        let mut audio = NullAudio;
        let mut bullets = vec![Bullet {
            position: Vec2::new(500.0, 500.0),
            velocity: Vec2::new(0.1, 0.0),
            lifetime: 5,
        }];

        for _ in 0..4 {
            update_bullets(&mut bullets, &mut particles, &mut grid, &mut rng, &mut audio);
            assert_eq!(bullets.len(), 1);
        }
        update_bullets(&mut bullets, &mut particles, &mut grid, &mut rng, &mut audio);
        assert!(bullets.is_empty());
        assert!(particles.is_empty());
    }

    #[test]
    fn test_bullet_removed_on_grid_exit() {
        let mut grid = Grid::new(10, 10);
        let mut particles = Vec::new();
        let mut rng = test_rng();
        let mut audio = NullAudio;
        let mut bullets = vec![Bullet {
            position: Vec2::new(8.0, 5.0),
            velocity: Vec2::new(3.0, 0.0),
            lifetime: BULLET_LIFETIME,
        }];

        update_bullets(&mut bullets, &mut particles, &mut grid, &mut rng, &mut audio);
        assert!(bullets.is_empty());
    }

    #[test]
    fn test_end_to_end_hit_scenario() {
        // 10x10 floor grid, single wall at (5,5), bullet travelling +x
        let mut grid = Grid::new(10, 10);
        grid.set_height(5, 5, HeightLevel::Wall);
        let mut particles = Vec::new();
        let mut rng = test_rng();
        let mut audio = NullAudio;
        let mut bullets = vec![Bullet {
            position: Vec2::new(0.0, 5.0),
            velocity: Vec2::new(1.0, 0.0),
            lifetime: BULLET_LIFETIME,
        }];

        // Advance until the segment reaches the wall
        for _ in 0..6 {
            update_bullets(&mut bullets, &mut particles, &mut grid, &mut rng, &mut audio);
            if bullets.is_empty() {
                break;
            }
        }

        assert!(bullets.is_empty(), "bullet should be consumed by the wall");
        assert_eq!(grid.get(5, 5).height, HeightLevel::Floor);
        assert_eq!(particles.len(), PARTICLES_PER_HIT as usize);
        for p in &particles {
            assert_eq!(p.position, Vec2::new(5.0, 5.0));
            // Burst is biased along the hit normal (-1, 0)
            assert!(p.velocity.x < 0.0);
        }
    }
}
