//! File watching for buffers backed by files on disk.
//!
//! A source directory holds up to three files, `index.html`, `style.css` and
//! `script.js`. Any change to one of them is reported as a change notification
//! of the corresponding buffer. Uses the native watcher when available and falls
//! back to polling otherwise.

use crate::buffer::BufferKind;
use notify::{Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::SystemTime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Events emitted by the source watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The file backing this buffer was modified, created or removed.
    Changed(BufferKind),
    /// Watcher error occurred.
    Error(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Notify(#[from] notify::Error),
}

/// Configuration for the source watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Polling interval in milliseconds for fallback polling mode
    pub poll_interval_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

enum Backend {
    Native(RecommendedWatcher),
    Polling(mpsc::Sender<()>),
}

/// Watches the source files of a directory.
///
/// Watching stops when this is dropped.
pub struct SourceWatcher {
    backend: Backend,
    dir: PathBuf,
}

impl std::fmt::Debug for SourceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match self.backend {
            Backend::Native(_) => "native",
            Backend::Polling(_) => "polling",
        };
        f.debug_struct("SourceWatcher")
            .field("backend", &backend)
            .field("dir", &self.dir)
            .finish()
    }
}

impl SourceWatcher {
    /// Starts watching `dir`, returning the watcher and its event stream.
    ///
    /// The polling fallback runs on the current tokio runtime.
    pub fn new(
        dir: &Path,
        config: WatcherConfig,
    ) -> Result<(Self, UnboundedReceiver<WatchEvent>), WatchError> {
        if !dir.is_dir() {
            return Err(WatchError::NotADirectory(dir.to_path_buf()));
        }

        let dir = dir.to_path_buf();
        let (event_tx, event_rx) = unbounded_channel();

        let backend = match Self::try_native_watcher(&dir, event_tx.clone()) {
            Ok(watcher) => {
                tracing::info!(?dir, "Started native source watcher");
                Backend::Native(watcher)
            }
            Err(err) => {
                tracing::warn!(
                    ?err,
                    ?dir,
                    "native source watcher failed, falling back to polling"
                );
                Backend::Polling(Self::spawn_polling_watcher(&dir, config, event_tx))
            }
        };

        Ok((Self { backend, dir }, event_rx))
    }

    /// Get the directory being watched.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn try_native_watcher(
        dir: &Path,
        event_tx: UnboundedSender<WatchEvent>,
    ) -> Result<RecommendedWatcher, notify::Error> {
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<NotifyEvent, notify::Error>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove())
                    {
                        return;
                    }

                    let mut kinds: Vec<BufferKind> = event
                        .paths
                        .iter()
                        .filter_map(|p| p.file_name()?.to_str())
                        .filter_map(BufferKind::from_file_name)
                        .collect();
                    kinds.dedup();

                    for kind in kinds {
                        let _ = event_tx.send(WatchEvent::Changed(kind));
                    }
                }
                Err(e) => {
                    tracing::error!(?e, "Source watcher error");
                    let _ = event_tx.send(WatchEvent::Error(e.to_string()));
                }
            },
            notify::Config::default(),
        )?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(watcher)
    }

    fn spawn_polling_watcher(
        dir: &Path,
        config: WatcherConfig,
        event_tx: UnboundedSender<WatchEvent>,
    ) -> mpsc::Sender<()> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let dir = dir.to_path_buf();
        let poll_interval = std::time::Duration::from_millis(config.poll_interval_ms);

        tokio::spawn(async move {
            let mtime = |kind: BufferKind| -> Option<SystemTime> {
                std::fs::metadata(dir.join(kind.file_name()))
                    .and_then(|m| m.modified())
                    .ok()
            };

            let mut last_mtimes: HashMap<BufferKind, Option<SystemTime>> = BufferKind::ALL
                .into_iter()
                .map(|kind| (kind, mtime(kind)))
                .collect();

            tracing::info!(
                ?dir,
                poll_interval_ms = config.poll_interval_ms,
                "Started polling-based source watcher"
            );

            loop {
                // Check for shutdown
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                tokio::time::sleep(poll_interval).await;

                for kind in BufferKind::ALL {
                    let current = mtime(kind);
                    if last_mtimes.get(&kind) != Some(&current) {
                        last_mtimes.insert(kind, current);
                        if event_tx.send(WatchEvent::Changed(kind)).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}

impl Drop for SourceWatcher {
    fn drop(&mut self) {
        if let Backend::Polling(tx) = &self.backend {
            let _ = tx.send(());
        }
    }
}

/// Reads the file backing `kind` in `dir`, a missing file being an empty buffer.
pub fn read_source(dir: &Path, kind: BufferKind) -> std::io::Result<String> {
    match std::fs::read_to_string(dir.join(kind.file_name())) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err),
    }
}
