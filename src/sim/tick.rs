//! Fixed timestep simulation tick
//!
//! Single-threaded frame pipeline. Ordering is the consistency contract:
//! bullet-driven terrain destruction commits before the lighting engine
//! reads the height field, so the light field always matches this frame's
//! terrain.

use log::warn;

use crate::audio::AudioSink;
use crate::lighting::LightingEngine;
use crate::sim::state::{TickInput, WorldState};
use crate::sim::{bullet, light, particle};

/// Advance the world by one fixed timestep and recompute the light field.
///
/// The lighting compute is a blocking step; a transient backend failure
/// leaves the previous frame's light levels in place and the simulation
/// carries on.
pub fn tick(
    state: &mut WorldState,
    input: &TickInput,
    engine: &mut LightingEngine,
    audio: &mut dyn AudioSink,
    dt: f32,
) {
    state.time_ticks += 1;

    state.player.update(&state.grid, input.move_axis, input.aim);
    state.torch.update(&state.player, state.total_time());

    // Terrain edits from this frame's bullets land here, ahead of lighting
    bullet::update_bullets(
        &mut state.bullets,
        &mut state.particles,
        &mut state.grid,
        &mut state.rng,
        audio,
    );
    particle::update_particles(&mut state.particles);
    light::update_radial_lights(
        &mut state.lights,
        state.grid.width(),
        state.grid.height(),
        dt,
    );

    if input.fire {
        bullet::fire(&mut state.bullets, &mut state.player, audio);
    }
    if input.toggle_torch {
        state.torch_on = !state.torch_on;
    }

    if let Err(err) = engine.compute(&mut state.grid, &state.lights, &state.torch, state.torch_on) {
        warn!("lighting pass failed, keeping previous light levels: {err}");
    }
}
