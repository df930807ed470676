// Sound library module
// Ordered list of imported clips and its JSON persistence

pub mod entry;
pub mod manager;
pub mod store;

pub use entry::{is_supported_audio, SoundEntry, SUPPORTED_EXTENSIONS};
pub use manager::SoundLibrary;
pub use store::{JsonFileStore, SoundStore};
