//! Module root watcher for hot reload.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::lifecycle::signals::ReloadReason;
use crate::modules::registry::ModuleRegistry;

/// Watches the module root and requests a rebuild when anything below it changes.
pub struct ModuleWatcher {
    registry: Arc<ModuleRegistry>,
    poll_interval: Duration,
    reload_tx: mpsc::UnboundedSender<ReloadReason>,
}

impl ModuleWatcher {
    pub fn new(
        registry: Arc<ModuleRegistry>,
        poll_interval: Duration,
        reload_tx: mpsc::UnboundedSender<ReloadReason>,
    ) -> Self {
        Self {
            registry,
            poll_interval,
            reload_tx,
        }
    }

    /// Start watching. The returned watcher stops when dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let root: PathBuf = self.registry.config().module_root.clone();
        let registry = self.registry.clone();
        let tx = self.reload_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_relevant(&event) => {
                    tracing::debug!(paths = ?event.paths, "Module root changed");
                    registry.invalidate();
                    let _ = tx.send(ReloadReason::ModulesChanged);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Module watch error"),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        tracing::info!(root = %root.display(), "Module watcher started");
        Ok(watcher)
    }
}

fn is_relevant(event: &Event) -> bool {
    event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove()
}
