// Persistence gateway for the sound list
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SoundboardError};
use super::entry::SoundEntry;

/// Whole-list storage for sound entries
pub trait SoundStore: Send {
    /// Read every persisted entry; an absent store reads as empty
    fn read_all(&self) -> Result<Vec<SoundEntry>>;

    /// Replace the persisted list
    fn write_all(&self, entries: &[SoundEntry]) -> Result<()>;
}

/// Pretty-printed JSON array on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SoundStore for JsonFileStore {
    fn read_all(&self) -> Result<Vec<SoundEntry>> {
        if !self.path.exists() {
            log::debug!("[Store] {:?} does not exist, reading as empty", self.path);
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SoundboardError::io(&self.path, e))?;

        serde_json::from_str(&content).map_err(|e| SoundboardError::json(&self.path, e))
    }

    fn write_all(&self, entries: &[SoundEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SoundboardError::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| SoundboardError::json(&self.path, e))?;

        // Write beside the target, then swap it in
        let temp = self.temp_path();
        fs::write(&temp, content).map_err(|e| SoundboardError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| SoundboardError::io(&self.path, e))?;

        log::debug!("[Store] Wrote {} entries to {:?}", entries.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("sounds.json"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_rewrite_preserves_order_and_values() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("sounds.json"));
        let entries = vec![
            SoundEntry::new("Zeta", "/clips/z.ogg"),
            SoundEntry::new("Alpha", "/clips/a.mp3"),
            SoundEntry::new("Mid", "/clips/m.wav"),
        ];
        store.write_all(&entries).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let read = store.read_all().unwrap();
        assert_eq!(read, entries);

        store.write_all(&read).unwrap();
        let after = fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_output_is_pretty_printed() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("sounds.json"));
        store.write_all(&[SoundEntry::new("PingSound", "./a.mp3")]).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            content,
            "[\n  {\n    \"name\": \"PingSound\",\n    \"filePath\": \"./a.mp3\"\n  }\n]"
        );
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sounds.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.read_all(), Err(SoundboardError::Json { .. })));
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("sounds.json"));
        store.write_all(&[]).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }
}
