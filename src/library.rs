//! Read-only data: the genre-expanded catalog and the quest templates.
//!
//! A reload builds a fresh `Library` and swaps it in whole, so readers see
//! either the old data or the new, never a mix.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::catalog::{Catalog, GENRES_FILE, SONGS_FILE};
use crate::quest::{TEMPLATES_FILE, TemplateRegistry};

/// Files whose changes trigger a library reload
const WATCHED_FILES: [&str; 3] = [GENRES_FILE, SONGS_FILE, TEMPLATES_FILE];

#[derive(Debug, Default)]
pub struct Library {
    pub catalog: Catalog,
    pub templates: TemplateRegistry,
}

impl Library {
    pub fn new(catalog: Catalog, templates: TemplateRegistry) -> Self {
        Self { catalog, templates }
    }

    pub fn load(data_dir: &Path) -> Self {
        info!("Loading library from {:?}", data_dir);
        Self::new(
            Catalog::load_from_directory(data_dir),
            TemplateRegistry::load_from_directory(data_dir),
        )
    }
}

/// Events from the hot-reload watcher
#[derive(Debug, Clone)]
pub enum HotReloadEvent {
    /// The library was rebuilt after a change to this file
    Reloaded(String),
    /// The watcher could not be set up
    Error(String),
}

fn is_watched(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| WATCHED_FILES.contains(&name))
}

/// Watch `data_dir` and rebuild the library when one of its source files
/// changes. `quests.json` is written by this process and never triggers a
/// reload.
pub fn start_file_watcher(
    library: Arc<RwLock<Library>>,
    data_dir: PathBuf,
) -> Result<tokio::sync::mpsc::Receiver<HotReloadEvent>, String> {
    use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    if !data_dir.is_dir() {
        return Err(format!("Data directory does not exist: {:?}", data_dir));
    }

    let (tx, rx) = tokio::sync::mpsc::channel(32);
    let rt = tokio::runtime::Handle::try_current().map_err(|e| format!("No tokio runtime: {}", e))?;

    // notify is sync, so the watcher lives on its own thread
    std::thread::spawn(move || {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = match RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        ) {
            Ok(w) => w,
            Err(e) => {
                error!("Failed to create file watcher: {}", e);
                let _ = tx.blocking_send(HotReloadEvent::Error(e.to_string()));
                return;
            }
        };

        if let Err(e) = watcher.watch(&data_dir, RecursiveMode::NonRecursive) {
            error!("Failed to watch data directory: {}", e);
            let _ = tx.blocking_send(HotReloadEvent::Error(e.to_string()));
            return;
        }

        info!("Library hot-reload watcher started for {:?}", data_dir);

        while let Ok(event) = notify_rx.recv() {
            use notify::EventKind;
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                continue;
            }

            let Some(path) = event.paths.iter().find(|p| is_watched(p)) else {
                continue;
            };

            info!("Detected change in {:?}, reloading library", path);

            let library = Arc::clone(&library);
            let tx = tx.clone();
            let data_dir = data_dir.clone();
            let changed = path.to_string_lossy().to_string();

            rt.spawn(async move {
                let fresh = tokio::task::spawn_blocking(move || Library::load(&data_dir)).await;
                match fresh {
                    Ok(fresh) => {
                        *library.write().await = fresh;
                        info!("Hot-reload completed");
                        let _ = tx.send(HotReloadEvent::Reloaded(changed)).await;
                    }
                    Err(e) => {
                        error!("Hot-reload failed: {}", e);
                        let _ = tx.send(HotReloadEvent::Error(e.to_string())).await;
                    }
                }
            });
        }
    });

    Ok(rx)
}
