use std::path::Path;

use crate::error::{Result, SoundboardError};
use super::entry::{is_supported_audio, SoundEntry};
use super::store::SoundStore;

/// Ordered sound collection backed by a store.
///
/// Every mutation re-reads the persisted list, applies the change and writes
/// the whole list back. `entries` mirrors the last state seen on disk. An
/// unparseable file is replaced by the in-memory list on the next write.
pub struct SoundLibrary<S: SoundStore> {
    store: S,
    entries: Vec<SoundEntry>,
}

impl<S: SoundStore> SoundLibrary<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
        }
    }

    /// Load the persisted list, falling back to an empty library on failure
    pub fn load(&mut self) -> &[SoundEntry] {
        self.entries = match self.store.read_all() {
            Ok(entries) => {
                log::info!("[Library] Loaded {} sounds", entries.len());
                entries
            }
            Err(e) => {
                log::error!("[Library] Failed to load sounds, starting empty: {}", e);
                Vec::new()
            }
        };
        &self.entries
    }

    pub fn entries(&self) -> &[SoundEntry] {
        &self.entries
    }

    pub fn get(&self, file_path: &str) -> Option<&SoundEntry> {
        self.entries.iter().find(|e| e.file_path == file_path)
    }

    /// Persisted list for a read-modify-write cycle
    fn current(&self) -> Result<Vec<SoundEntry>> {
        match self.store.read_all() {
            Err(e @ SoundboardError::Json { .. }) => {
                log::warn!("[Library] Overwriting unreadable sound list: {}", e);
                Ok(self.entries.clone())
            }
            other => other,
        }
    }

    /// Import a selected file. `None` means the selection was cancelled.
    pub fn add(&mut self, selected: Option<&Path>) -> Result<Option<SoundEntry>> {
        let Some(path) = selected else {
            return Ok(None);
        };

        if !is_supported_audio(path) {
            return Err(SoundboardError::UnsupportedFormat(path.to_path_buf()));
        }

        let entry = SoundEntry::from_path(path);
        let mut sounds = self.current()?;

        if let Some(existing) = sounds.iter().find(|s| s.file_path == entry.file_path) {
            log::info!("[Library] {} is already on the board", entry.file_path);
            let existing = existing.clone();
            self.entries = sounds;
            return Ok(Some(existing));
        }

        sounds.push(entry.clone());
        self.store.write_all(&sounds)?;
        self.entries = sounds;

        log::info!("[Library] Added {:?} ({})", entry.name, entry.file_path);
        Ok(Some(entry))
    }

    /// Rename a sound. Returns false when the name is blank or the sound is unknown.
    pub fn rename(&mut self, file_path: &str, new_name: &str) -> Result<bool> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            log::debug!("[Library] Ignoring blank name for {}", file_path);
            return Ok(false);
        }

        let mut sounds = self.current()?;
        let Some(sound) = sounds.iter_mut().find(|s| s.file_path == file_path) else {
            return Ok(false);
        };
        sound.name = new_name.to_string();

        self.store.write_all(&sounds)?;
        self.entries = sounds;

        log::info!("[Library] Renamed {} to {:?}", file_path, new_name);
        Ok(true)
    }

    /// Remove the first sound with this path
    pub fn remove(&mut self, file_path: &str) -> Result<Option<SoundEntry>> {
        let mut sounds = self.current()?;
        let Some(index) = sounds.iter().position(|s| s.file_path == file_path) else {
            return Ok(None);
        };
        let removed = sounds.remove(index);

        self.store.write_all(&sounds)?;
        self.entries = sounds;

        log::info!("[Library] Removed {:?} ({})", removed.name, removed.file_path);
        Ok(Some(removed))
    }
}
