// Crate-wide error type
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SoundboardError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported audio format: {0:?} (expected mp3, wav or ogg)")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("No clip registered for {0}")]
    UnknownClip(String),

    #[error("Invalid {0}: must be a finite number")]
    NotFinite(&'static str),
}

impl SoundboardError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }

    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Decode { path: path.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, SoundboardError>;
