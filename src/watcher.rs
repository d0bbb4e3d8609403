use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::events::{FileEvent, FileEventKind};

/// Which event classes are subscribed. Unsubscribed classes are dropped
/// inside the watcher thread and never delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventMask {
    pub created: bool,
    pub changed: bool,
    pub deleted: bool,
}

impl EventMask {
    pub fn all() -> Self {
        Self {
            created: true,
            changed: true,
            deleted: true,
        }
    }

    pub fn any(&self) -> bool {
        self.created || self.changed || self.deleted
    }

    fn allows(&self, kind: FileEventKind) -> bool {
        match kind {
            FileEventKind::Created => self.created,
            FileEventKind::Changed => self.changed,
            FileEventKind::Deleted => self.deleted,
        }
    }
}

/// Recursive watch over a base directory, filtered by one glob pattern.
/// Dropping the watcher tears the subscription down; events already sent
/// on the channel stay receivable.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    event_rx: Receiver<FileEvent>,
}

impl FileWatcher {
    pub fn new<P: AsRef<Path>>(base: P, glob_pattern: &str, mask: EventMask) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let matcher = Glob::new(glob_pattern)
            .with_context(|| format!("Invalid glob pattern: {glob_pattern}"))?
            .compile_matcher();

        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let (event_tx, event_rx) = mpsc::channel::<FileEvent>();

        let mut watcher =
            notify::recommended_watcher(tx).context("Failed to create file system watcher")?;
        watcher
            .watch(&base, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to start watching {}", base.display()))?;

        thread::spawn(move || {
            let mut last_event_time = HashMap::<(PathBuf, FileEventKind), Instant>::new();

            while let Ok(result) = rx.recv() {
                match result {
                    Ok(event) => {
                        let kind = match event.kind {
                            notify::EventKind::Create(_) => FileEventKind::Created,
                            notify::EventKind::Modify(_) => FileEventKind::Changed,
                            notify::EventKind::Remove(_) => FileEventKind::Deleted,
                            _ => continue,
                        };
                        if !mask.allows(kind) {
                            continue;
                        }

                        let now = Instant::now();
                        for path in event.paths {
                            if !matches_pattern(&matcher, &base, &path) {
                                continue;
                            }

                            // Debounce rapid duplicates on the same path
                            if let Some(last) = last_event_time.get(&(path.clone(), kind)) {
                                if now.duration_since(*last) < Duration::from_millis(100) {
                                    continue;
                                }
                            }
                            last_event_time.insert((path.clone(), kind), now);

                            if event_tx.send(FileEvent::new(path, kind)).is_err() {
                                return; // receiver dropped
                            }
                        }
                    }
                    Err(err) => {
                        tracing::error!("File watcher error: {err}");
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_rx,
        })
    }

    pub fn try_recv(&self) -> Result<FileEvent, mpsc::TryRecvError> {
        self.event_rx.try_recv()
    }

    pub fn recv(&self) -> Result<FileEvent, mpsc::RecvError> {
        self.event_rx.recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<FileEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

/// A pattern like `*.js` should match by file name anywhere under the
/// base, while patterns with directories match the base-relative path.
fn matches_pattern(matcher: &GlobMatcher, base: &Path, path: &Path) -> bool {
    if let Some(name) = path.file_name() {
        if matcher.is_match(name) {
            return true;
        }
    }
    match path.strip_prefix(base) {
        Ok(relative) => matcher.is_match(relative),
        Err(_) => matcher.is_match(path),
    }
}
