//! Hot reload of the config file.
//!
//! The parent directory is watched rather than the file, so editors that
//! save by writing a temporary file and renaming it over the original are
//! still seen. Each relevant event reloads and validates the file; a config
//! is forwarded only when it differs from the last one forwarded.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RelayConfig;

/// Watches a config file and streams changed configs.
pub struct ConfigWatcher {
    dir: PathBuf,
    reloader: Reloader,
}

impl ConfigWatcher {
    /// Watch `path`, starting from the already applied `current` config.
    pub fn new(
        path: &Path,
        current: RelayConfig,
    ) -> (Self, mpsc::UnboundedReceiver<RelayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        (
            Self {
                dir,
                reloader: Reloader {
                    path: path.to_path_buf(),
                    file_name: path.file_name().map(|n| n.to_os_string()),
                    last: current,
                    update_tx,
                },
            },
            update_rx,
        )
    }

    /// Start watching on notify's background thread.
    ///
    /// Updates stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let mut reloader = self.reloader;
        let path = reloader.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => reloader.on_event(&event),
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Reload state owned by the watcher callback.
struct Reloader {
    path: PathBuf,
    file_name: Option<OsString>,
    last: RelayConfig,
    update_tx: mpsc::UnboundedSender<RelayConfig>,
}

impl Reloader {
    fn on_event(&mut self, event: &Event) {
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return;
        }
        let ours = event
            .paths
            .iter()
            .any(|p| p.file_name().map(|n| n.to_os_string()) == self.file_name);
        if ours {
            self.reload();
        }
    }

    /// Load the file and forward it if it changed. Returns whether it was sent.
    fn reload(&mut self) -> bool {
        let config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = ?self.path,
                    "Failed to reload config, keeping current configuration"
                );
                return false;
            }
        };
        if config == self.last {
            tracing::debug!(path = ?self.path, "Config file touched without changes");
            return false;
        }

        tracing::info!(path = ?self.path, "Config change detected");
        self.last = config.clone();
        self.update_tx.send(config).is_ok()
    }
}
