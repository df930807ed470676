// Playback module
// Tile state machine, transport panel and volume handling

pub mod clip;
pub mod controller;
pub mod panel;

pub use clip::{ClipState, GroupToggles, MasterGain};
pub use controller::{PlaybackController, DEFAULT_SEEK_STEP_SECS};
pub use panel::{format_time, PanelView, TileView};
