// Audio playback module
// Uses Symphonia for decoding, rubato for resampling and cpal for output

pub mod backend;
pub mod decoder;
pub mod engine;
pub mod mixer;
pub mod output;
pub mod resample;

pub use backend::{AudioBackend, ClipVoice};
pub use decoder::{decode_file, ClipBuffer};
pub use engine::{AudioEngine, EngineVoice};
