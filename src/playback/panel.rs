// Read-only snapshots for the transport panel and the tile grid
use serde::Serialize;

use super::clip::ClipState;

pub const NO_SOUND_LABEL: &str = "No Sound Playing";

/// `m:ss`, truncating fractional seconds
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

/// Slider value shown next to the panel volume
pub fn volume_readout(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub visible: bool,
    pub name: String,
    pub file_path: Option<String>,
    pub is_playing: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub progress_percent: f64,
    pub current_time: String,
    pub total_time: String,
    pub volume: f32,
    pub volume_readout: u32,
}

impl PanelView {
    pub fn hidden(volume: f32) -> Self {
        Self {
            visible: false,
            name: NO_SOUND_LABEL.to_string(),
            file_path: None,
            is_playing: false,
            position_secs: 0.0,
            duration_secs: 0.0,
            progress_percent: 0.0,
            current_time: format_time(0.0),
            total_time: format_time(0.0),
            volume,
            volume_readout: volume_readout(volume),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileView {
    pub name: String,
    pub file_path: String,
    pub state: ClipState,
    pub focused: bool,
    pub volume: f32,
    pub loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(61.5), "1:01");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_volume_readout_rounds() {
        assert_eq!(volume_readout(0.0), 0);
        assert_eq!(volume_readout(0.456), 46);
        assert_eq!(volume_readout(1.0), 100);
    }

    #[test]
    fn test_hidden_panel() {
        let panel = PanelView::hidden(0.5);
        assert!(!panel.visible);
        assert_eq!(panel.name, NO_SOUND_LABEL);
        assert_eq!(panel.total_time, "0:00");
        assert_eq!(panel.volume_readout, 50);
    }
}
