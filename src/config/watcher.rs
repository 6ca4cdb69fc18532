//! Configuration file watcher for hot reload.

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigSource};
use crate::config::schema::Config;

/// Watches the configuration file and emits validated configs on change.
///
/// The parent directory is watched rather than the file itself, so editors that
/// save by renaming a new file over the old one keep triggering reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<Config>,
}

impl ConfigWatcher {
    /// Create a watcher that publishes on an existing channel.
    pub fn new(path: &Path, update_tx: mpsc::UnboundedSender<Config>) -> Self {
        Self {
            path: path.to_path_buf(),
            update_tx,
        }
    }

    /// Start watching. The returned handle must be kept alive for events to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let source = ConfigSource::File(self.path.clone());
        let file_name = self.path.file_name().map(OsString::from).ok_or_else(|| {
            notify::Error::generic("config path has no file name").add_path(self.path.clone())
        })?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if concerns(&event, &file_name) => {
                    tracing::info!(source = %source, "Config file change detected, reloading");
                    reload_into(&source, &tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), dir = %dir.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// True for a create or modify event (renames included) touching `file_name`.
fn concerns(event: &Event, file_name: &OsString) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

/// Load `source` and forward it; failures keep the running configuration.
pub fn reload_into(source: &ConfigSource, tx: &mpsc::UnboundedSender<Config>) {
    match load_config(source) {
        Ok(config) => {
            if tx.send(config).is_err() {
                tracing::debug!("Config receiver dropped, ignoring reload");
            }
        }
        Err(e) => {
            tracing::error!(source = %source, error = %e, "Failed to reload config, keeping current configuration");
        }
    }
}
