// Seam between the playback controller and the audio engine
use std::path::Path;

use crate::error::{Result, SoundboardError};

/// One loaded clip that can be started, paused and repositioned.
/// Positions and durations are in seconds.
pub trait ClipVoice {
    /// Start or resume from the current position
    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, position: f64);

    fn position(&self) -> f64;

    /// Total length, if known
    fn duration(&self) -> Option<f64>;

    fn set_volume(&mut self, volume: f32);

    /// True once playback ran off the end of the clip, until the next seek
    fn has_ended(&self) -> bool;
}

/// Loads clips into voices
pub trait AudioBackend {
    type Voice: ClipVoice;

    fn load(&self, path: &Path) -> Result<Self::Voice>;
}

/// Stand-in when no output device could be opened: every load fails, so
/// clips register unloaded and stay idle.
impl<B: AudioBackend> AudioBackend for Option<B> {
    type Voice = B::Voice;

    fn load(&self, path: &Path) -> Result<Self::Voice> {
        match self {
            Some(backend) => backend.load(path),
            None => Err(SoundboardError::Device("no audio output available".into())),
        }
    }
}
