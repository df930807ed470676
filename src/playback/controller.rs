// Playback controller: one focused clip, group exclusivity, transport panel
use std::collections::HashMap;
use std::path::Path;

use crate::audio::{AudioBackend, ClipVoice};
use crate::error::{Result, SoundboardError};
use crate::library::SoundEntry;
use super::clip::{ClipSlot, ClipState, GroupToggles, MasterGain};
use super::panel::{format_time, volume_readout, PanelView, TileView};

pub const DEFAULT_SEEK_STEP_SECS: f64 = 10.0;

/// Owns every clip's runtime state. All transitions go through here.
pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    clips: HashMap<String, ClipSlot<B::Voice>>,
    /// Registration order, for the tile grid
    order: Vec<String>,
    focused: Option<String>,
    toggles: GroupToggles,
    master: MasterGain,
    panel_volume: f32,
    seek_step: f64,
    default_volume: f32,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clips: HashMap::new(),
            order: Vec::new(),
            focused: None,
            toggles: GroupToggles::default(),
            master: MasterGain::default(),
            panel_volume: 1.0,
            seek_step: DEFAULT_SEEK_STEP_SECS,
            default_volume: 1.0,
        }
    }

    pub fn with_seek_step(mut self, seconds: f64) -> Self {
        self.seek_step = seconds.max(0.0);
        self
    }

    pub fn with_default_volume(mut self, volume: f32) -> Self {
        self.default_volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ===== Tile registry =====

    /// Create a tile for the entry, loading its audio. A clip that fails to
    /// load is still registered and retried on activation.
    pub fn register(&mut self, entry: &SoundEntry) {
        if let Some(slot) = self.clips.get_mut(&entry.file_path) {
            slot.name = entry.name.clone();
            return;
        }

        let mut slot = ClipSlot::new(entry.name.clone(), self.default_volume);
        slot.voice = Self::try_load(&self.backend, &entry.file_path);
        slot.apply_volume(self.master.factor());

        self.order.push(entry.file_path.clone());
        self.clips.insert(entry.file_path.clone(), slot);
    }

    /// Tear down a tile. Returns false if it was not registered.
    pub fn unregister(&mut self, file_path: &str) -> bool {
        let Some(mut slot) = self.clips.remove(file_path) else {
            return false;
        };
        slot.reset();
        self.order.retain(|p| p != file_path);
        self.clear_focus_if(file_path);
        true
    }

    /// Return a clip to idle from any state
    pub fn stop(&mut self, file_path: &str) -> bool {
        let Some(slot) = self.clips.get_mut(file_path) else {
            return false;
        };
        slot.reset();
        self.clear_focus_if(file_path);
        true
    }

    pub fn rename(&mut self, file_path: &str, name: &str) {
        if let Some(slot) = self.clips.get_mut(file_path) {
            slot.name = name.to_string();
        }
    }

    fn try_load(backend: &B, file_path: &str) -> Option<B::Voice> {
        match backend.load(Path::new(file_path)) {
            Ok(voice) => Some(voice),
            Err(e) => {
                log::error!("[Playback] Failed to load {}: {}", file_path, e);
                None
            }
        }
    }

    fn slot_mut(&mut self, file_path: &str) -> Result<&mut ClipSlot<B::Voice>> {
        self.clips
            .get_mut(file_path)
            .ok_or_else(|| SoundboardError::UnknownClip(file_path.to_string()))
    }

    fn clear_focus_if(&mut self, file_path: &str) {
        if self.focused.as_deref() == Some(file_path) {
            self.focused = None;
        }
    }

    // ===== Tile activation =====

    /// Toggle a tile: start it from the top if idle, otherwise stop it.
    pub fn activate(&mut self, file_path: &str) -> Result<ClipState> {
        let master = self.master.factor();
        let slot = self
            .clips
            .get_mut(file_path)
            .ok_or_else(|| SoundboardError::UnknownClip(file_path.to_string()))?;

        if slot.is_active() {
            slot.reset();
            self.clear_focus_if(file_path);
            log::debug!("[Playback] Stopped {}", file_path);
            return Ok(ClipState::Idle);
        }

        if slot.voice.is_none() {
            slot.voice = Self::try_load(&self.backend, file_path);
            if slot.voice.is_none() {
                return Ok(ClipState::Idle);
            }
            slot.apply_volume(master);
        }

        if self.toggles.stop_others {
            for (path, other) in self.clips.iter_mut() {
                if path != file_path && other.is_active() {
                    other.reset();
                }
            }
        }

        if self.toggles.mute_others {
            let panel_volume = self.panel_volume;
            for (path, other) in self.clips.iter_mut() {
                if path != file_path {
                    other.volume = 0.0;
                    other.apply_volume(master);
                }
            }
            let slot = self.slot_mut(file_path)?;
            slot.volume = panel_volume;
            slot.apply_volume(master);
        }

        let slot = self.slot_mut(file_path)?;
        if let Some(voice) = slot.voice.as_mut() {
            voice.seek(0.0);
            voice.play();
        }
        slot.state = ClipState::Playing;
        let volume = slot.volume;

        self.focused = Some(file_path.to_string());
        self.panel_volume = volume;

        log::debug!("[Playback] Playing {}", file_path);
        Ok(ClipState::Playing)
    }

    /// Natural end of a clip: loop it if it is focused and looping is on,
    /// otherwise return it to idle.
    pub fn on_clip_ended(&mut self, file_path: &str) -> Result<ClipState> {
        let looping = self.toggles.loop_focused && self.focused.as_deref() == Some(file_path);
        let slot = self.slot_mut(file_path)?;

        if slot.state != ClipState::Playing {
            return Ok(slot.state);
        }

        if looping {
            if let Some(voice) = slot.voice.as_mut() {
                voice.seek(0.0);
                voice.play();
            }
            return Ok(ClipState::Playing);
        }

        slot.reset();
        self.clear_focus_if(file_path);
        Ok(ClipState::Idle)
    }

    /// Pick up end-of-clip signals from the engine. Returns the clips whose
    /// state was re-evaluated and where they ended up.
    pub fn poll(&mut self) -> Vec<(String, ClipState)> {
        let ended: Vec<String> = self
            .clips
            .iter()
            .filter(|(_, slot)| slot.state == ClipState::Playing)
            .filter(|(_, slot)| slot.voice.as_ref().map(|v| v.has_ended()).unwrap_or(false))
            .map(|(path, _)| path.clone())
            .collect();

        ended
            .into_iter()
            .filter_map(|path| {
                let state = self.on_clip_ended(&path).ok()?;
                Some((path, state))
            })
            .collect()
    }

    // ===== Transport panel =====

    fn focused_slot_mut(&mut self) -> Option<&mut ClipSlot<B::Voice>> {
        let path = self.focused.as_deref()?;
        self.clips.get_mut(path)
    }

    /// Resume the focused clip without rewinding
    pub fn panel_play(&mut self) -> bool {
        let Some(slot) = self.focused_slot_mut() else {
            return false;
        };
        if let Some(voice) = slot.voice.as_mut() {
            voice.play();
        }
        slot.state = ClipState::Playing;
        true
    }

    pub fn panel_pause(&mut self) -> bool {
        let Some(slot) = self.focused_slot_mut() else {
            return false;
        };
        if let Some(voice) = slot.voice.as_mut() {
            voice.pause();
        }
        slot.state = ClipState::Paused;
        true
    }

    /// Stop, rewind and release the focused clip; the panel hides
    pub fn panel_stop(&mut self) -> bool {
        let Some(slot) = self.focused_slot_mut() else {
            return false;
        };
        slot.reset();
        self.focused = None;
        true
    }

    pub fn seek_forward(&mut self) -> Option<f64> {
        let step = self.seek_step;
        let slot = self.focused_slot_mut()?;
        let duration = slot.duration()?;
        let target = (slot.position() + step).min(duration);
        slot.voice.as_mut()?.seek(target);
        Some(target)
    }

    pub fn seek_backward(&mut self) -> Option<f64> {
        let step = self.seek_step;
        let slot = self.focused_slot_mut()?;
        let target = (slot.position() - step).max(0.0);
        slot.voice.as_mut()?.seek(target);
        Some(target)
    }

    /// Seek to a fraction of the focused clip, as from a progress bar click
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Option<f64> {
        if !fraction.is_finite() {
            return None;
        }
        let slot = self.focused_slot_mut()?;
        let duration = slot.duration().filter(|d| *d > 0.0)?;
        let target = fraction.clamp(0.0, 1.0) * duration;
        slot.voice.as_mut()?.seek(target);
        Some(target)
    }

    // ===== Volume =====

    /// Tile slider; mirrored to the panel when the clip is focused
    pub fn set_clip_volume(&mut self, file_path: &str, volume: f32) -> Result<()> {
        if !volume.is_finite() {
            return Err(SoundboardError::NotFinite("volume"));
        }
        let volume = volume.clamp(0.0, 1.0);
        let master = self.master.factor();
        let slot = self.slot_mut(file_path)?;
        slot.volume = volume;
        slot.apply_volume(master);

        if self.focused.as_deref() == Some(file_path) {
            self.panel_volume = volume;
        }
        Ok(())
    }

    /// Panel slider; drives the focused clip. No effect without focus.
    pub fn set_panel_volume(&mut self, volume: f32) -> bool {
        if !volume.is_finite() {
            return false;
        }
        let volume = volume.clamp(0.0, 1.0);
        let master = self.master.factor();
        let Some(slot) = self.focused_slot_mut() else {
            return false;
        };
        slot.volume = volume;
        slot.apply_volume(master);
        self.panel_volume = volume;
        true
    }

    /// Returns false, leaving the gain as is, for a non-finite volume
    pub fn set_master_volume(&mut self, volume: f32) -> bool {
        if !volume.is_finite() {
            return false;
        }
        self.master.volume = volume.clamp(0.0, 1.0);
        self.apply_master();
        true
    }

    /// Flip global mute, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.master.muted = !self.master.muted;
        self.apply_master();
        self.master.muted
    }

    fn apply_master(&mut self) {
        let master = self.master.factor();
        for slot in self.clips.values_mut() {
            slot.apply_volume(master);
        }
    }

    // ===== Accessors =====

    pub fn set_toggles(&mut self, toggles: GroupToggles) {
        self.toggles = toggles;
    }

    pub fn toggles(&self) -> GroupToggles {
        self.toggles
    }

    pub fn master(&self) -> MasterGain {
        self.master
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn panel_volume(&self) -> f32 {
        self.panel_volume
    }

    pub fn state(&self, file_path: &str) -> Option<ClipState> {
        self.clips.get(file_path).map(|s| s.state)
    }

    pub fn volume(&self, file_path: &str) -> Option<f32> {
        self.clips.get(file_path).map(|s| s.volume)
    }

    pub fn position(&self, file_path: &str) -> Option<f64> {
        self.clips.get(file_path).map(|s| s.position())
    }

    pub fn panel(&self) -> PanelView {
        let Some((path, slot)) = self
            .focused
            .as_deref()
            .and_then(|p| self.clips.get(p).map(|s| (p, s)))
        else {
            return PanelView::hidden(self.panel_volume);
        };

        let position = slot.position();
        let duration = slot.duration().unwrap_or(0.0);
        let progress = if duration > 0.0 {
            (position / duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        PanelView {
            visible: true,
            name: slot.name.clone(),
            file_path: Some(path.to_string()),
            is_playing: slot.state == ClipState::Playing,
            position_secs: position,
            duration_secs: duration,
            progress_percent: progress,
            current_time: format_time(position),
            total_time: format_time(duration),
            volume: self.panel_volume,
            volume_readout: volume_readout(self.panel_volume),
        }
    }

    pub fn tiles(&self) -> Vec<TileView> {
        self.order
            .iter()
            .filter_map(|path| {
                let slot = self.clips.get(path)?;
                Some(TileView {
                    name: slot.name.clone(),
                    file_path: path.clone(),
                    state: slot.state,
                    focused: self.focused.as_deref() == Some(path.as_str()),
                    volume: slot.volume,
                    loaded: slot.voice.is_some(),
                })
            })
            .collect()
    }
}
