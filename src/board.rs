// The board: library and playback kept in step
use std::path::Path;

use crate::audio::AudioBackend;
use crate::error::Result;
use crate::library::{SoundEntry, SoundLibrary, SoundStore};
use crate::playback::PlaybackController;

pub struct Soundboard<S: SoundStore, B: AudioBackend> {
    library: SoundLibrary<S>,
    playback: PlaybackController<B>,
}

impl<S: SoundStore, B: AudioBackend> Soundboard<S, B> {
    /// Load the library and build a tile for every sound
    pub fn open(mut library: SoundLibrary<S>, mut playback: PlaybackController<B>) -> Self {
        for entry in library.load() {
            playback.register(entry);
        }
        Self { library, playback }
    }

    pub fn entries(&self) -> &[SoundEntry] {
        self.library.entries()
    }

    pub fn playback(&self) -> &PlaybackController<B> {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController<B> {
        &mut self.playback
    }

    /// Import the selected file (None = cancelled) and give it a tile
    pub fn add(&mut self, selected: Option<&Path>) -> Result<Option<SoundEntry>> {
        let entry = self.library.add(selected)?;
        if let Some(entry) = &entry {
            self.playback.register(entry);
        }
        Ok(entry)
    }

    pub fn rename(&mut self, file_path: &str, new_name: &str) -> Result<bool> {
        if !self.library.rename(file_path, new_name)? {
            return Ok(false);
        }
        if let Some(entry) = self.library.get(file_path) {
            self.playback.rename(file_path, &entry.name);
        }
        Ok(true)
    }

    /// Stop the clip, drop it from disk, then drop its tile
    pub fn remove(&mut self, file_path: &str) -> Result<Option<SoundEntry>> {
        self.playback.stop(file_path);
        let removed = self.library.remove(file_path)?;
        self.playback.unregister(file_path);
        Ok(removed)
    }
}
