// Tauri command handlers
use std::path::Path;
use std::path::PathBuf;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;

use crate::error::SoundboardError;
use crate::library::{SoundEntry, SUPPORTED_EXTENSIONS};
use crate::playback::{ClipState, GroupToggles, MasterGain, PanelView, TileView};
use crate::state::AppState;

fn report(action: &str, e: SoundboardError) -> String {
    log::error!("{} failed: {}", action, e);
    format!("Failed to {}: {}", action, e)
}

// ===== Library Commands =====

#[tauri::command]
pub fn load_sounds(state: State<'_, AppState>) -> Vec<SoundEntry> {
    state.board.lock().entries().to_vec()
}

#[tauri::command]
pub async fn add_sound(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<Option<SoundEntry>, String> {
    let selected = app
        .dialog()
        .file()
        .add_filter("Audio Files", SUPPORTED_EXTENSIONS)
        .blocking_pick_file();

    let path: Option<PathBuf> = match selected {
        Some(file) => Some(
            file.into_path()
                .map_err(|e| format!("Failed to resolve selected file: {}", e))?,
        ),
        None => None,
    };

    state
        .board
        .lock()
        .add(path.as_deref())
        .map_err(|e| report("add sound", e))
}

#[tauri::command]
pub fn rename_sound(
    file_path: String,
    new_name: String,
    state: State<'_, AppState>,
) -> Result<bool, String> {
    state
        .board
        .lock()
        .rename(&file_path, &new_name)
        .map_err(|e| report("rename sound", e))
}

#[tauri::command]
pub fn remove_sound(file_path: String, state: State<'_, AppState>) -> Result<(), String> {
    let mut board = state.board.lock();
    board
        .remove(&file_path)
        .map_err(|e| report("remove sound", e))?;
    if let Some(engine) = board.playback().backend() {
        engine.evict(Path::new(&file_path));
    }
    Ok(())
}

// ===== Tile Commands =====

#[tauri::command]
pub fn activate_clip(file_path: String, state: State<'_, AppState>) -> Result<ClipState, String> {
    state
        .board
        .lock()
        .playback_mut()
        .activate(&file_path)
        .map_err(|e| report("activate clip", e))
}

#[tauri::command]
pub fn set_clip_volume(
    file_path: String,
    volume: f32,
    state: State<'_, AppState>,
) -> Result<(), String> {
    state
        .board
        .lock()
        .playback_mut()
        .set_clip_volume(&file_path, volume)
        .map_err(|e| report("set clip volume", e))
}

#[tauri::command]
pub fn get_tiles(state: State<'_, AppState>) -> Vec<TileView> {
    state.board.lock().playback().tiles()
}

// ===== Transport Panel Commands =====

#[tauri::command]
pub fn panel_play(state: State<'_, AppState>) -> PanelView {
    let mut board = state.board.lock();
    board.playback_mut().panel_play();
    board.playback().panel()
}

#[tauri::command]
pub fn panel_pause(state: State<'_, AppState>) -> PanelView {
    let mut board = state.board.lock();
    board.playback_mut().panel_pause();
    board.playback().panel()
}

#[tauri::command]
pub fn panel_stop(state: State<'_, AppState>) -> PanelView {
    let mut board = state.board.lock();
    board.playback_mut().panel_stop();
    board.playback().panel()
}

#[tauri::command]
pub fn seek_forward(state: State<'_, AppState>) -> Option<f64> {
    state.board.lock().playback_mut().seek_forward()
}

#[tauri::command]
pub fn seek_backward(state: State<'_, AppState>) -> Option<f64> {
    state.board.lock().playback_mut().seek_backward()
}

#[tauri::command]
pub fn seek_to_fraction(fraction: f64, state: State<'_, AppState>) -> Option<f64> {
    state.board.lock().playback_mut().seek_to_fraction(fraction)
}

#[tauri::command]
pub fn set_panel_volume(volume: f32, state: State<'_, AppState>) -> PanelView {
    let mut board = state.board.lock();
    board.playback_mut().set_panel_volume(volume);
    board.playback().panel()
}

#[tauri::command]
pub fn get_panel_state(state: State<'_, AppState>) -> PanelView {
    state.board.lock().playback().panel()
}

// ===== Global Controls =====

#[tauri::command]
pub fn get_group_toggles(state: State<'_, AppState>) -> GroupToggles {
    state.board.lock().playback().toggles()
}

#[tauri::command]
pub fn set_group_toggles(toggles: GroupToggles, state: State<'_, AppState>) -> Result<(), String> {
    state.board.lock().playback_mut().set_toggles(toggles);
    state
        .remember_toggles(toggles)
        .map_err(|e| report("save toggles", e))
}

#[tauri::command]
pub fn set_master_volume(volume: f32, state: State<'_, AppState>) -> Result<MasterGain, String> {
    let mut board = state.board.lock();
    if !board.playback_mut().set_master_volume(volume) {
        return Err(report("set master volume", SoundboardError::NotFinite("volume")));
    }
    Ok(board.playback().master())
}

#[tauri::command]
pub fn toggle_mute(state: State<'_, AppState>) -> MasterGain {
    let mut board = state.board.lock();
    board.playback_mut().toggle_mute();
    board.playback().master()
}
