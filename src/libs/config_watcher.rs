// Watches `opencode.json` for edits made outside the launcher.
//
// The parent directory is watched rather than the file: editors and our own atomic writes
// replace the file by rename, which drops a watch placed on the old inode. Events are
// debounced with a fixed quiet window so one save reports once.

use crate::libs::errors::LauncherResult;
use crate::libs::tool_config::ToolConfigDocument;
use crate::log_debug;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

pub const DEBOUNCE: Duration = Duration::from_millis(500);

pub struct ConfigWatcher {
    path: PathBuf,
    // Dropping the watcher stops event delivery.
    _watcher: RecommendedWatcher,
    rx: Receiver<()>,
}

impl ConfigWatcher {
    pub fn start(path: &Path) -> LauncherResult<Self> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;
        let file_name: Option<OsString> = path.file_name().map(OsString::from);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else { return };
            let touches_file = event
                .paths
                .iter()
                .any(|p| p.file_name().map(OsString::from) == file_name);
            if touches_file && (event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
                let _ = tx.send(());
            }
        })?;
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;
        log_debug!("[Watch] Watching {} for {}", parent.display(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            _watcher: watcher,
            rx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocks until the file changes, then waits out [`DEBOUNCE`] and drains the burst.
    /// Returns `false` on timeout or if the watcher has shut down.
    pub fn wait_for_change(&self, timeout: Option<Duration>) -> bool {
        let received = match timeout {
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(()) => true,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
            },
            None => self.rx.recv().is_ok(),
        };
        if !received {
            return false;
        }
        thread::sleep(DEBOUNCE);
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        log_debug!("[Watch] Change detected ({} coalesced events)", drained + 1);
        true
    }
}

/// What `watch` reports after each reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    pub default_model: Option<String>,
    pub providers: usize,
    pub models: usize,
}

pub fn summarize(path: &Path) -> LauncherResult<WatchSummary> {
    let doc = ToolConfigDocument::load(path)?;
    Ok(WatchSummary {
        default_model: doc.config.model.clone(),
        providers: doc.config.provider.len(),
        models: doc.config.provider.values().map(|p| p.models.len()).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::errors::LauncherError;

    #[test]
    fn summary_counts_providers_and_models() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opencode.json");
        fs::write(
            &path,
            r#"{"provider":{"a":{"models":{"x":{},"y":{}}},"b":{"models":{}}},"model":"a/x"}"#,
        )
        .unwrap();

        let summary = summarize(&path).unwrap();
        assert_eq!(
            summary,
            WatchSummary {
                default_model: Some("a/x".to_string()),
                providers: 2,
                models: 2,
            }
        );
    }

    #[test]
    fn broken_file_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opencode.json");
        fs::write(&path, "{ half").unwrap();
        assert!(matches!(summarize(&path), Err(LauncherError::Json { .. })));
    }

    #[test]
    fn write_to_watched_file_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opencode.json");
        let watcher = ConfigWatcher::start(&path).unwrap();

        fs::write(&path, "{}").unwrap();

        assert!(watcher.wait_for_change(Some(Duration::from_secs(10))));
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opencode.json");
        let watcher = ConfigWatcher::start(&path).unwrap();

        fs::write(dir.path().join("other.json"), "{}").unwrap();

        assert!(!watcher.wait_for_change(Some(Duration::from_millis(700))));
    }
}
