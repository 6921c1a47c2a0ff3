//! Hot reload of the settings file.
//!
//! Another process (a second `skycycle set`, or a user editing the file) may change
//! the persisted preferences while a store is open. The watcher observes the file's
//! directory, waits for bursts of events to settle, and asks the store to reload;
//! subscribers are only notified when the value actually changed.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::store::SettingsStore;
use crate::common::constants::WATCH_DEBOUNCE_MS;
use crate::common::utils::private_path;

/// Watches the file behind a [`SettingsStore`] and reloads it on change.
pub struct SettingsWatcher {
    store: Arc<SettingsStore>,
    debug_enabled: bool,
}

impl SettingsWatcher {
    pub fn new(store: Arc<SettingsStore>, debug_enabled: bool) -> Self {
        Self {
            store,
            debug_enabled,
        }
    }

    /// Spawn the watcher thread.
    ///
    /// Watching lasts as long as the returned guard. Stores without a backing file
    /// have nothing to watch; this is not an error.
    pub fn start(self) -> Result<WatchGuard> {
        let Some(settings_path) = self.store.location() else {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Settings are not file-backed; hot reload disabled");
            }
            return Ok(WatchGuard::idle());
        };

        let watch_dir = settings_path
            .parent()
            .map(|dir| dir.to_path_buf())
            .context("Settings file has no parent directory")?;
        std::fs::create_dir_all(&watch_dir).with_context(|| {
            format!("Failed to create state directory {}", private_path(&watch_dir))
        })?;

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        // Watch the directory: atomic replacement swaps the file's inode
        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {}", private_path(&watch_dir)))?;

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Watching settings for changes:");
            log_indented!("{}", private_path(&settings_path));
        }

        let store = self.store;
        let debug_enabled = self.debug_enabled;
        let stop = Arc::new(AtomicBool::new(false));
        let stopped = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);

            while !stopped.load(Ordering::SeqCst) {
                let event = match rx.recv_timeout(debounce) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                };
                if !affects_settings(&event, &settings_path) {
                    continue;
                }

                // Let editors and atomic renames finish before reading
                loop {
                    match rx.recv_timeout(debounce) {
                        Ok(_) => continue,
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                if stopped.load(Ordering::SeqCst) {
                    break;
                }

                match store.reload() {
                    Ok(true) => {
                        if debug_enabled {
                            log_pipe!();
                            log_info!("Settings changed on disk, reloaded");
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log_pipe!();
                        log_warning!("Failed to reload settings: {e:#}");
                    }
                }
            }
        });

        Ok(WatchGuard {
            stop,
            watcher: Some(watcher),
            handle: Some(handle),
        })
    }
}

/// Keeps a [`SettingsWatcher`] running. Dropping it stops the watch and joins the
/// thread, releasing the store it held.
pub struct WatchGuard {
    stop: Arc<AtomicBool>,
    watcher: Option<RecommendedWatcher>,
    handle: Option<JoinHandle<()>>,
}

impl WatchGuard {
    fn idle() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(true)),
            watcher: None,
            handle: None,
        }
    }

    /// Whether a watcher thread is running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        // Dropping the notify watcher removes the watch and closes the event channel
        drop(self.watcher.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Whether an event concerns the settings file itself.
fn affects_settings(event: &Event, settings_path: &Path) -> bool {
    event.paths.iter().any(|path| {
        path == settings_path
            || (path.parent() == settings_path.parent()
                && path
                    .file_name()
                    .zip(settings_path.file_name())
                    .is_some_and(|(name, watched)| {
                        name.to_string_lossy()
                            .starts_with(watched.to_string_lossy().as_ref())
                    }))
    })
}
