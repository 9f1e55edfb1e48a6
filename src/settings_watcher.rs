//! Hot reload for the settings file.
//!
//! Watches the settings file's directory (editors often replace the file
//! instead of writing it in place) and reports changes to that one file.

use crate::error::SettingsError;
use crate::settings::Settings;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, channel};
use tracing::{debug, warn};

pub use crate::settings::default_settings_path;

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEvent {
    /// The file changed and parsed successfully
    Changed(Settings),
    /// The file was removed; defaults apply
    Removed,
}

pub struct SettingsWatcher {
    path: PathBuf,
    // Dropping the watcher stops the OS subscription
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
}

impl SettingsWatcher {
    pub fn new(path: PathBuf) -> Result<Self, SettingsError> {
        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            path,
            _watcher: watcher,
            rx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending file events and report the latest change, if any.
    pub fn poll(&mut self) -> Option<SettingsEvent> {
        let mut latest = None;

        while let Ok(result) = self.rx.try_recv() {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    warn!("settings watcher error: {e}");
                    continue;
                }
            };
            if !event.paths.iter().any(|p| p.file_name() == self.path.file_name()) {
                continue;
            }

            latest = match event.kind {
                EventKind::Remove(_) if !self.path.exists() => Some(SettingsEvent::Removed),
                EventKind::Create(_) | EventKind::Modify(_) => match Settings::load(&self.path) {
                    Ok(settings) => Some(SettingsEvent::Changed(settings)),
                    Err(e) => {
                        // Partial writes fail to parse; the next event retries
                        debug!("settings not reloaded: {e}");
                        latest
                    }
                },
                _ => latest,
            };
        }

        latest
    }
}
