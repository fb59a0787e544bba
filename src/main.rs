//! Headless session driver
//!
//! Runs a scripted session at the fixed tick rate and reports frame timing,
//! which is dominated by the lighting pass. Useful for profiling the GPU
//! kernel against the CPU fallback on the same world.

use std::path::Path;
use std::time::Instant;

use glam::Vec2;

use gridfire::audio::NullAudio;
use gridfire::config::WorldConfig;
use gridfire::consts::SIM_DT;
use gridfire::lighting::LightingEngine;
use gridfire::render::{build_cell_instances, build_particle_instances};
use gridfire::sim::{TickInput, WorldState, tick};

const DEMO_TICKS: u64 = 600;

/// Scripted input: orbit the aim point, drive forward, fire on a cadence
fn scripted_input(tick_no: u64, state: &WorldState) -> TickInput {
    let t = tick_no as f32 * SIM_DT;
    let aim = state.player.position + Vec2::new(t.cos(), t.sin()) * 10.0;
    TickInput {
        move_axis: Vec2::new(1.0, 0.0),
        aim: Some(aim),
        fire: tick_no % 12 == 0,
        toggle_torch: tick_no % 240 == 120,
    }
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => WorldConfig::load(Path::new(&path)),
        None => WorldConfig::default(),
    };

    let mut engine =
        match LightingEngine::new(config.backend, config.grid_width, config.grid_height) {
            Ok(engine) => engine,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        };
    log::info!(
        "lighting backend: {}, grid {}x{}",
        engine.backend_name(),
        config.grid_width,
        config.grid_height
    );

    let mut state = WorldState::new(&config);
    let mut audio = NullAudio;

    let start = Instant::now();
    let mut lighting_total = 0.0f64;
    for n in 0..DEMO_TICKS {
        let input = scripted_input(n, &state);
        let frame_start = Instant::now();
        tick(&mut state, &input, &mut engine, &mut audio, SIM_DT);
        lighting_total += frame_start.elapsed().as_secs_f64();

        if n % 60 == 59 {
            let lit = engine.light_levels().iter().filter(|&&l| l > 0).count();
            log::info!(
                "tick {}: {} bullets, {} particles, {} lit cells",
                n + 1,
                state.bullets.len(),
                state.particles.len(),
                lit
            );
        }
    }

    // One frame's worth of render output, to exercise the full path
    let mut instances = build_cell_instances(&state.grid);
    instances.extend(build_particle_instances(
        &state.particles,
        config.grid_width,
        config.grid_height,
    ));

    let elapsed = start.elapsed().as_secs_f64();
    log::info!(
        "{} ticks in {:.2}s ({:.2}ms/tick, {:.2}ms avg sim+lighting), {} instances",
        DEMO_TICKS,
        elapsed,
        elapsed * 1000.0 / DEMO_TICKS as f64,
        lighting_total * 1000.0 / DEMO_TICKS as f64,
        instances.len()
    );
}
