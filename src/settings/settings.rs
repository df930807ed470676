// Settings management and persistence
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SoundboardError};
use crate::playback::{GroupToggles, DEFAULT_SEEK_STEP_SECS};

/// Where the sound list lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    pub file_name: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            file_name: "sounds.json".to_string(),
        }
    }
}

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub seek_step_secs: f64,
    pub default_clip_volume: f32, // 0.0-1.0
    pub preload_on_start: bool,
    pub progress_interval_ms: u64,
    /// Toggle state the board starts with
    pub toggles: GroupToggles,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            seek_step_secs: DEFAULT_SEEK_STEP_SECS,
            default_clip_volume: 1.0,
            preload_on_start: true,
            progress_interval_ms: 250,
            toggles: GroupToggles::default(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub version: i32, // Settings schema version for future migrations
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            library: LibrarySettings::default(),
            playback: PlaybackSettings::default(),
        }
    }
}

impl AppSettings {
    /// Get the settings file path
    pub fn get_settings_path(app_dir: &Path) -> PathBuf {
        app_dir.join("settings.json")
    }

    /// Path of the sound list inside the app directory
    pub fn library_path(&self, app_dir: &Path) -> PathBuf {
        app_dir.join(&self.library.file_name)
    }

    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = Self::get_settings_path(app_dir);

        if !path.exists() {
            log::info!("[Settings] No settings file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| SoundboardError::io(&path, e))?;

        let settings: AppSettings =
            serde_json::from_str(&content).map_err(|e| SoundboardError::json(&path, e))?;

        log::info!("[Settings] Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Like `load`, but an unreadable file falls back to defaults
    pub fn load_or_default(app_dir: &Path) -> Self {
        Self::load(app_dir).unwrap_or_else(|e| {
            log::warn!("[Settings] {}, using defaults", e);
            Self::default()
        })
    }

    /// Save settings to file
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        // Ensure directory exists
        fs::create_dir_all(app_dir).map_err(|e| SoundboardError::io(app_dir, e))?;

        let path = Self::get_settings_path(app_dir);
        let content =
            serde_json::to_string_pretty(self).map_err(|e| SoundboardError::json(&path, e))?;

        fs::write(&path, content).map_err(|e| SoundboardError::io(&path, e))?;

        log::info!("[Settings] Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = AppSettings::load(dir.path()).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.playback.seek_step_secs, 10.0);
        assert_eq!(settings.library_path(dir.path()), dir.path().join("sounds.json"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let app_dir = dir.path().join("app");
        let mut settings = AppSettings::default();
        settings.playback.seek_step_secs = 5.0;
        settings.playback.toggles.loop_focused = true;

        settings.save(&app_dir).unwrap();
        assert_eq!(AppSettings::load(&app_dir).unwrap(), settings);
    }

    #[test]
    fn test_save_over_a_file_is_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("app");
        fs::write(&blocker, "").unwrap();

        let result = AppSettings::default().save(&blocker);
        assert!(matches!(result, Err(SoundboardError::Io { .. })));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            AppSettings::get_settings_path(dir.path()),
            r#"{ "playback": { "preload_on_start": false } }"#,
        )
        .unwrap();

        let settings = AppSettings::load(dir.path()).unwrap();
        assert!(!settings.playback.preload_on_start);
        assert_eq!(settings.playback.progress_interval_ms, 250);
        assert_eq!(settings.library.file_name, "sounds.json");
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempdir().unwrap();
        fs::write(AppSettings::get_settings_path(dir.path()), "not json").unwrap();

        assert!(matches!(
            AppSettings::load(dir.path()),
            Err(SoundboardError::Json { .. })
        ));
        assert_eq!(AppSettings::load_or_default(dir.path()), AppSettings::default());
    }
}
