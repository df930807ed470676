// Soundboard - Desktop Soundboard
// Module declarations
pub mod audio;
pub mod board;
pub mod error;
pub mod library;
pub mod playback;
pub mod settings;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
pub mod state;

pub use board::Soundboard;
pub use error::{Result, SoundboardError};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use anyhow::Context;
    use std::time::Duration;
    use tauri::Manager;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Soundboard...");

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let app_dir = app
                .path()
                .app_data_dir()
                .context("Failed to get app data directory")?;

            let app_state = state::AppState::new(app_dir);

            let interval_ms = app_state.settings.lock().playback.progress_interval_ms;
            let interval = Duration::from_millis(interval_ms.max(16));
            state::spawn_progress_reporter(app.handle().clone(), app_state.board.clone(), interval);

            app.manage(app_state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::load_sounds,
            commands::add_sound,
            commands::rename_sound,
            commands::remove_sound,
            commands::activate_clip,
            commands::set_clip_volume,
            commands::get_tiles,
            commands::panel_play,
            commands::panel_pause,
            commands::panel_stop,
            commands::seek_forward,
            commands::seek_backward,
            commands::seek_to_fraction,
            commands::set_panel_volume,
            commands::get_panel_state,
            commands::get_group_toggles,
            commands::set_group_toggles,
            commands::set_master_volume,
            commands::toggle_mute,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
