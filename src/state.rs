// Application state management
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tauri::{AppHandle, Emitter};

use crate::audio::AudioEngine;
use crate::board::Soundboard;
use crate::error::Result;
use crate::library::{JsonFileStore, SoundLibrary, SoundStore};
use crate::playback::{ClipState, GroupToggles, PlaybackController};
use crate::settings::AppSettings;

/// `None` engine: no output device, clips stay idle
pub type Board = Soundboard<JsonFileStore, Option<AudioEngine>>;

/// One lock around library and playback; persistence round-trips never overlap
pub struct AppState {
    pub board: Arc<Mutex<Board>>,
    pub settings: Mutex<AppSettings>,
    pub app_dir: PathBuf,
}

impl AppState {
    pub fn new(app_dir: PathBuf) -> Self {
        let settings = AppSettings::load_or_default(&app_dir);
        let store = JsonFileStore::new(settings.library_path(&app_dir));

        let engine = match AudioEngine::new() {
            Ok(engine) => Some(engine),
            Err(e) => {
                log::error!("[Audio] {}; sounds will not play", e);
                None
            }
        };

        if let (Some(engine), true) = (&engine, settings.playback.preload_on_start) {
            let paths: Vec<PathBuf> = store
                .read_all()
                .unwrap_or_default()
                .into_iter()
                .map(|e| PathBuf::from(e.file_path))
                .collect();
            engine.warm_cache(&paths);
        }

        let mut playback = PlaybackController::new(engine)
            .with_seek_step(settings.playback.seek_step_secs)
            .with_default_volume(settings.playback.default_clip_volume);
        playback.set_toggles(settings.playback.toggles);

        let library_path = store.path().to_path_buf();
        let board = Soundboard::open(SoundLibrary::new(store), playback);
        log::info!(
            "Soundboard ready with {} sounds from {:?}",
            board.entries().len(),
            library_path
        );

        Self {
            board: Arc::new(Mutex::new(board)),
            settings: Mutex::new(settings),
            app_dir,
        }
    }

    /// Keep the toggles for the next start
    pub fn remember_toggles(&self, toggles: GroupToggles) -> Result<()> {
        let mut settings = self.settings.lock();
        if settings.playback.toggles == toggles {
            return Ok(());
        }
        settings.playback.toggles = toggles;
        settings.save(&self.app_dir)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipStateChanged {
    pub file_path: String,
    pub state: ClipState,
}

/// Poll end-of-clip and push the panel to the frontend at a fixed rate
pub fn spawn_progress_reporter(app: AppHandle, board: Arc<Mutex<Board>>, interval: Duration) {
    tauri::async_runtime::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            let (transitions, panel) = {
                let mut board = board.lock();
                let transitions = board.playback_mut().poll();
                (transitions, board.playback().panel())
            };

            for (file_path, state) in transitions {
                let _ = app.emit("clip-state-changed", ClipStateChanged { file_path, state });
            }
            if panel.visible {
                let _ = app.emit("playback-progress", &panel);
            }
        }
    });
}
