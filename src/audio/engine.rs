// Audio engine: decoded clip cache in front of the output mixer
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use super::backend::{AudioBackend, ClipVoice};
use super::decoder::{decode_file, ClipBuffer};
use super::mixer::{Mixer, VoiceCursor, VoiceId};
use super::output::AudioOutput;
use super::resample::conform;

pub struct AudioEngine {
    mixer: Arc<Mutex<Mixer>>,
    sample_rate: u32,
    channels: usize,
    cache: Mutex<HashMap<PathBuf, Arc<ClipBuffer>>>,
    /// Device stream pulling from `mixer`; kept alive with the engine
    _output: Option<AudioOutput>,
}

impl AudioEngine {
    /// Start the engine on the default output device
    pub fn new() -> Result<Self> {
        let mixer = Arc::new(Mutex::new(Mixer::new()));
        let output = AudioOutput::new(mixer.clone())?;

        let mut engine =
            Self::with_mixer(mixer, output.sample_rate(), output.channels() as usize);
        engine._output = Some(output);
        Ok(engine)
    }

    /// Engine over a mixer rendered by someone else. Clips are conformed to
    /// `sample_rate` and `channels`.
    pub fn with_mixer(mixer: Arc<Mutex<Mixer>>, sample_rate: u32, channels: usize) -> Self {
        Self {
            mixer,
            sample_rate,
            channels: channels.max(1),
            cache: Mutex::new(HashMap::new()),
            _output: None,
        }
    }

    /// Decode clips ahead of time, in parallel. Failures are logged and left
    /// for `load` to retry.
    pub fn warm_cache(&self, paths: &[PathBuf]) -> usize {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let decoded: Vec<(PathBuf, Arc<ClipBuffer>)> = paths
            .par_iter()
            .filter(|path| !self.cache.lock().contains_key(*path))
            .filter_map(|path| match Self::prepare(path, sample_rate, channels) {
                Ok(clip) => Some((path.clone(), Arc::new(clip))),
                Err(e) => {
                    log::warn!("Preload failed for {:?}: {}", path, e);
                    None
                }
            })
            .collect();

        let count = decoded.len();
        self.cache.lock().extend(decoded);
        log::info!("Preloaded {} of {} clips", count, paths.len());
        count
    }

    pub fn evict(&self, path: &Path) {
        self.cache.lock().remove(path);
    }

    fn prepare(path: &Path, sample_rate: u32, channels: usize) -> Result<ClipBuffer> {
        let clip = decode_file(path)?;
        conform(clip, sample_rate, channels)
    }

    fn clip(&self, path: &Path) -> Result<Arc<ClipBuffer>> {
        if let Some(clip) = self.cache.lock().get(path) {
            return Ok(clip.clone());
        }

        let clip = Arc::new(Self::prepare(path, self.sample_rate, self.channels)?);
        self.cache.lock().insert(path.to_path_buf(), clip.clone());
        Ok(clip)
    }
}

impl AudioBackend for AudioEngine {
    type Voice = EngineVoice;

    fn load(&self, path: &Path) -> Result<EngineVoice> {
        let clip = self.clip(path)?;
        let duration = clip.duration_secs();
        let mixer = self.mixer.clone();
        let id = mixer.lock().add_voice(clip);

        Ok(EngineVoice { id, mixer, duration })
    }
}

/// Handle to a voice in the shared mixer; removed from the mix on drop
pub struct EngineVoice {
    id: VoiceId,
    mixer: Arc<Mutex<Mixer>>,
    duration: f64,
}

impl EngineVoice {
    fn with_cursor<R>(&self, f: impl FnOnce(&mut VoiceCursor) -> R) -> Option<R> {
        self.mixer.lock().voice_mut(self.id).map(f)
    }

    fn read_cursor<R>(&self, f: impl FnOnce(&VoiceCursor) -> R) -> Option<R> {
        self.mixer.lock().voice(self.id).map(f)
    }
}

impl ClipVoice for EngineVoice {
    fn play(&mut self) {
        self.with_cursor(|c| c.playing = true);
    }

    fn pause(&mut self) {
        self.with_cursor(|c| c.playing = false);
    }

    fn seek(&mut self, position: f64) {
        self.with_cursor(|c| c.seek_secs(position));
    }

    fn position(&self) -> f64 {
        self.read_cursor(|c| c.position_secs()).unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }

    fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        self.with_cursor(|c| c.volume = volume);
    }

    fn has_ended(&self) -> bool {
        self.read_cursor(|c| c.ended).unwrap_or(false)
    }
}

impl Drop for EngineVoice {
    fn drop(&mut self) {
        let mut mixer = self.mixer.lock();
        mixer.remove_voice(self.id);
        log::trace!("Voice {} released, {} left", self.id, mixer.voice_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decoder::tests::write_wav;
    use crate::library::SoundEntry;
    use crate::playback::{ClipState, GroupToggles, PlaybackController};
    use tempfile::{tempdir, TempDir};

    const RATE: u32 = 8000;

    /// Engine at 8 kHz mono with one 0.1 s clip at half scale
    fn engine_with_clip() -> (TempDir, PathBuf, AudioEngine) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blip.wav");
        write_wav(&path, RATE, &[16384; 800]);
        let engine = AudioEngine::with_mixer(Arc::new(Mutex::new(Mixer::new())), RATE, 1);
        (dir, path, engine)
    }

    fn render(engine: &AudioEngine, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        engine.mixer.lock().render(&mut out, 1);
        out
    }

    #[test]
    fn test_voice_plays_to_end() {
        let (_dir, path, engine) = engine_with_clip();
        let mut voice = engine.load(&path).unwrap();
        assert_eq!(voice.duration(), Some(0.1));

        voice.set_volume(0.5);
        voice.play();
        let out = render(&engine, 400);

        assert!((out[0] - 0.25).abs() < 1e-3);
        assert!((voice.position() - 0.05).abs() < 1e-9);
        assert!(!voice.has_ended());

        let out = render(&engine, 600);
        assert!((out[399] - 0.25).abs() < 1e-3);
        assert_eq!(out[400], 0.0);
        assert!(voice.has_ended());
        assert!((voice.position() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_seek_clears_end_and_pause_holds_position() {
        let (_dir, path, engine) = engine_with_clip();
        let mut voice = engine.load(&path).unwrap();
        voice.play();
        render(&engine, 1000);
        assert!(voice.has_ended());

        voice.seek(0.025);
        assert!(!voice.has_ended());
        assert!((voice.position() - 0.025).abs() < 1e-9);

        voice.play();
        voice.pause();
        assert_eq!(render(&engine, 100), vec![0.0; 100]);
        assert!((voice.position() - 0.025).abs() < 1e-9);
    }

    #[test]
    fn test_set_volume_is_clamped() {
        let (_dir, path, engine) = engine_with_clip();
        let mut voice = engine.load(&path).unwrap();

        voice.set_volume(3.0);
        assert_eq!(engine.mixer.lock().voice(voice.id).unwrap().volume, 1.0);
        voice.set_volume(-1.0);
        assert_eq!(engine.mixer.lock().voice(voice.id).unwrap().volume, 0.0);
        voice.set_volume(f32::NAN);
        assert_eq!(engine.mixer.lock().voice(voice.id).unwrap().volume, 0.0);
    }

    #[test]
    fn test_dropped_voice_leaves_mix() {
        let (_dir, path, engine) = engine_with_clip();
        let first = engine.load(&path).unwrap();
        let second = engine.load(&path).unwrap();
        assert_eq!(engine.mixer.lock().voice_count(), 2);

        drop(first);
        assert_eq!(engine.mixer.lock().voice_count(), 1);
        drop(second);
        assert_eq!(engine.mixer.lock().voice_count(), 0);
    }

    #[test]
    fn test_cache_warm_and_evict() {
        let (dir, path, engine) = engine_with_clip();
        let missing = dir.path().join("missing.wav");

        assert_eq!(engine.warm_cache(&[path.clone(), missing.clone()]), 1);
        assert_eq!(engine.warm_cache(&[path.clone()]), 0);

        engine.evict(&path);
        assert!(engine.cache.lock().is_empty());
        assert!(engine.load(&missing).is_err());
    }

    #[test]
    fn test_end_of_clip_reaches_controller() {
        let (_dir, path, engine) = engine_with_clip();
        let key = path.to_string_lossy().to_string();
        let mixer = engine.mixer.clone();
        let mut playback = PlaybackController::new(engine);
        playback.register(&SoundEntry::new("Blip", key.clone()));

        playback.activate(&key).unwrap();
        mixer.lock().render(&mut vec![0.0; 1000], 1);

        assert_eq!(playback.poll(), vec![(key.clone(), ClipState::Idle)]);
        assert_eq!(playback.focused(), None);
        assert_eq!(playback.position(&key), Some(0.0));
        assert!(playback.poll().is_empty());
    }

    #[test]
    fn test_focused_clip_loops_through_mixer() {
        let (_dir, path, engine) = engine_with_clip();
        let key = path.to_string_lossy().to_string();
        let mixer = engine.mixer.clone();
        let mut playback = PlaybackController::new(engine);
        playback.register(&SoundEntry::new("Blip", key.clone()));
        playback.set_toggles(GroupToggles { loop_focused: true, ..Default::default() });

        playback.activate(&key).unwrap();
        mixer.lock().render(&mut vec![0.0; 1000], 1);
        assert_eq!(playback.poll(), vec![(key.clone(), ClipState::Playing)]);

        let mut out = vec![0.0; 10];
        mixer.lock().render(&mut out, 1);
        assert!(out.iter().all(|s| (s - 0.5).abs() < 1e-3));
    }
}
