use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions accepted at the import boundary
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];

/// One tile on the board. `file_path` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundEntry {
    pub name: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

impl SoundEntry {
    pub fn new(name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
        }
    }

    /// Build an entry for an imported file, named after its base name
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Self {
            name,
            file_path: path.to_string_lossy().to_string(),
        }
    }
}

/// Check if a file has one of the importable audio extensions
pub fn is_supported_audio(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_base_name() {
        let entry = SoundEntry::from_path(Path::new("/home/me/clips/airhorn.mp3"));
        assert_eq!(entry.name, "airhorn.mp3");
        assert_eq!(entry.file_path, "/home/me/clips/airhorn.mp3");
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_audio(Path::new("a.mp3")));
        assert!(is_supported_audio(Path::new("b.WAV")));
        assert!(is_supported_audio(Path::new("c.Ogg")));
        assert!(!is_supported_audio(Path::new("d.flac")));
        assert!(!is_supported_audio(Path::new("no_extension")));
    }

    #[test]
    fn test_json_field_names() {
        let entry = SoundEntry::new("PingSound", "./a.mp3");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"name":"PingSound","filePath":"./a.mp3"}"#);
    }
}
