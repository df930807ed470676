// Settings module
// JSON settings file in the app data directory

#[allow(clippy::module_inception)]
pub mod settings;

pub use settings::{AppSettings, LibrarySettings, PlaybackSettings};
