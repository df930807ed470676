// Per-clip runtime state and the board-wide playback switches
use serde::{Deserialize, Serialize};

use crate::audio::ClipVoice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipState {
    Idle,
    Playing,
    /// Held by the transport panel; only the focused clip can be paused
    Paused,
}

/// Checkbox-style group behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupToggles {
    pub stop_others: bool,
    pub mute_others: bool,
    #[serde(rename = "loop")]
    pub loop_focused: bool,
}

/// Master volume and global mute, applied on top of each clip's own volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterGain {
    pub volume: f32,
    pub muted: bool,
}

impl Default for MasterGain {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
        }
    }
}

impl MasterGain {
    pub fn factor(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

/// Runtime record for one tile, keyed by file path in the controller
pub struct ClipSlot<V> {
    pub name: String,
    pub voice: Option<V>,
    /// Live volume in [0, 1], before master gain
    pub volume: f32,
    pub state: ClipState,
}

impl<V: ClipVoice> ClipSlot<V> {
    pub fn new(name: String, volume: f32) -> Self {
        Self {
            name,
            voice: None,
            volume,
            state: ClipState::Idle,
        }
    }

    pub fn apply_volume(&mut self, master: f32) {
        let effective = self.volume * master;
        if let Some(voice) = self.voice.as_mut() {
            voice.set_volume(effective);
        }
    }

    /// Pause and rewind to the start
    pub fn reset(&mut self) {
        if let Some(voice) = self.voice.as_mut() {
            voice.pause();
            voice.seek(0.0);
        }
        self.state = ClipState::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.state != ClipState::Idle
    }

    pub fn position(&self) -> f64 {
        self.voice.as_ref().map(|v| v.position()).unwrap_or(0.0)
    }

    pub fn duration(&self) -> Option<f64> {
        self.voice.as_ref().and_then(|v| v.duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_factor() {
        let mut master = MasterGain::default();
        assert_eq!(master.factor(), 1.0);

        master.volume = 0.4;
        assert_eq!(master.factor(), 0.4);

        master.muted = true;
        assert_eq!(master.factor(), 0.0);
    }

    #[test]
    fn test_toggles_json_names() {
        let toggles: GroupToggles =
            serde_json::from_str(r#"{"stopOthers":true,"muteOthers":false,"loop":true}"#).unwrap();
        assert!(toggles.stop_others);
        assert!(!toggles.mute_others);
        assert!(toggles.loop_focused);
    }
}
