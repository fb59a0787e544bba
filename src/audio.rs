//! Audio cue seam
//!
//! The simulation emits fire-and-forget cues through this trait; playback
//! failures or missing output are never allowed to affect gameplay. The
//! headless binary runs with `NullAudio`.

/// Sound cues the simulation can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// A bullet left the muzzle
    Fire,
    /// A bullet struck terrain
    Impact,
}

/// Playback seam. Implementations must not block the tick.
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Discards every cue
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) {}
}
