// Software mixer shared with the output callback
use std::collections::HashMap;
use std::sync::Arc;

use super::decoder::ClipBuffer;

pub type VoiceId = u64;

/// Playback cursor over one decoded clip
#[derive(Debug)]
pub struct VoiceCursor {
    pub clip: Arc<ClipBuffer>,
    /// Next frame to render
    pub frame: usize,
    pub playing: bool,
    pub volume: f32,
    /// Set when the cursor runs off the end of the clip
    pub ended: bool,
}

impl VoiceCursor {
    pub fn new(clip: Arc<ClipBuffer>) -> Self {
        Self {
            clip,
            frame: 0,
            playing: false,
            volume: 1.0,
            ended: false,
        }
    }

    pub fn position_secs(&self) -> f64 {
        if self.clip.sample_rate == 0 {
            return 0.0;
        }
        self.frame as f64 / self.clip.sample_rate as f64
    }

    pub fn seek_secs(&mut self, seconds: f64) {
        let frame = (seconds.max(0.0) * self.clip.sample_rate as f64).round() as usize;
        self.frame = frame.min(self.clip.frames());
        self.ended = false;
    }
}

/// Sums every playing voice into the output buffer
#[derive(Debug, Default)]
pub struct Mixer {
    voices: HashMap<VoiceId, VoiceCursor>,
    next_id: VoiceId,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_voice(&mut self, clip: Arc<ClipBuffer>) -> VoiceId {
        let id = self.next_id;
        self.next_id += 1;
        self.voices.insert(id, VoiceCursor::new(clip));
        id
    }

    pub fn remove_voice(&mut self, id: VoiceId) {
        self.voices.remove(&id);
    }

    pub fn voice(&self, id: VoiceId) -> Option<&VoiceCursor> {
        self.voices.get(&id)
    }

    pub fn voice_mut(&mut self, id: VoiceId) -> Option<&mut VoiceCursor> {
        self.voices.get_mut(&id)
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Render interleaved output. Clips must already match `channels`.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        out.iter_mut().for_each(|s| *s = 0.0);
        if channels == 0 {
            return;
        }
        let out_frames = out.len() / channels;

        for voice in self.voices.values_mut().filter(|v| v.playing) {
            let clip = &voice.clip;
            let clip_channels = clip.channels.max(1);
            let remaining = clip.frames().saturating_sub(voice.frame);
            let frames = remaining.min(out_frames);

            for i in 0..frames {
                let src = (voice.frame + i) * clip_channels;
                for ch in 0..channels {
                    out[i * channels + ch] += clip.samples[src + ch % clip_channels] * voice.volume;
                }
            }

            voice.frame += frames;
            if voice.frame >= clip.frames() {
                voice.playing = false;
                voice.ended = true;
            }
        }

        out.iter_mut().for_each(|s| *s = s.clamp(-1.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(samples: Vec<f32>, channels: usize) -> Arc<ClipBuffer> {
        Arc::new(ClipBuffer { samples, sample_rate: 4, channels })
    }

    #[test]
    fn test_idle_voices_are_silent() {
        let mut mixer = Mixer::new();
        mixer.add_voice(clip(vec![0.5; 8], 1));

        let mut out = vec![1.0; 4];
        mixer.render(&mut out, 1);
        assert_eq!(out, vec![0.0; 4]);
    }

    #[test]
    fn test_sums_voices_with_volume() {
        let mut mixer = Mixer::new();
        let a = mixer.add_voice(clip(vec![0.5; 8], 1));
        let b = mixer.add_voice(clip(vec![0.25; 8], 1));
        for id in [a, b] {
            mixer.voice_mut(id).unwrap().playing = true;
        }
        mixer.voice_mut(b).unwrap().volume = 0.5;

        let mut out = vec![0.0; 4];
        mixer.render(&mut out, 1);

        for s in out {
            assert!((s - 0.625).abs() < 1e-6);
        }
        assert_eq!(mixer.voice(a).unwrap().frame, 4);
    }

    #[test]
    fn test_output_is_clamped() {
        let mut mixer = Mixer::new();
        for _ in 0..3 {
            let id = mixer.add_voice(clip(vec![0.9; 4], 1));
            mixer.voice_mut(id).unwrap().playing = true;
        }

        let mut out = vec![0.0; 2];
        mixer.render(&mut out, 1);
        assert_eq!(out, vec![1.0, 1.0]);
    }

    #[test]
    fn test_voice_ends_and_pads_with_silence() {
        let mut mixer = Mixer::new();
        let id = mixer.add_voice(clip(vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3], 2));
        mixer.voice_mut(id).unwrap().playing = true;

        let mut out = vec![0.0; 8];
        mixer.render(&mut out, 2);

        assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.0, 0.0]);
        let voice = mixer.voice(id).unwrap();
        assert!(voice.ended);
        assert!(!voice.playing);
        assert!((voice.position_secs() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_seek_clamps_and_clears_end() {
        let mut mixer = Mixer::new();
        let id = mixer.add_voice(clip(vec![0.0; 8], 1));
        let voice = mixer.voice_mut(id).unwrap();
        voice.ended = true;

        voice.seek_secs(10.0);
        assert_eq!(voice.frame, 8);
        assert!(!voice.ended);

        voice.seek_secs(-1.0);
        assert_eq!(voice.frame, 0);
    }
}
