//! Watch session lifecycle
//!
//! One long-lived [`Session`] owns the status-bar registry, the
//! substitution engine, the workspace roots, and the active watch
//! subscriptions. Applying a new configuration disposes the old watchers
//! before the new ones start; events already delivered keep being
//! processed, future events from the old subscriptions stop.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::actions::{run_actions, NotificationSink, StatusBar};
use crate::config::NotifyConfig;
use crate::events::FileEvent;
use crate::subst::{EnvSource, SubstitutionContext, SubstitutionEngine};
use crate::watcher::FileWatcher;
use crate::workspace::WorkspaceRoots;

pub struct Session {
    roots: WorkspaceRoots,
    config: NotifyConfig,
    engine: SubstitutionEngine,
    status_bar: StatusBar,
    notifier: Box<dyn NotificationSink>,
    watchers: Vec<FileWatcher>,
}

impl Session {
    pub fn new(
        roots: WorkspaceRoots,
        config: NotifyConfig,
        env: Box<dyn EnvSource>,
        notifier: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            roots,
            config,
            engine: SubstitutionEngine::new(env),
            status_bar: StatusBar::new(),
            notifier,
            watchers: Vec::new(),
        }
    }

    /// Starts (or restarts) the watch subscriptions from the current
    /// configuration. With no `on*` key present nothing is subscribed and
    /// no watcher runs.
    pub fn start(&mut self) -> Result<()> {
        self.watchers.clear();
        let mask = self.config.subscriptions();
        if !mask.any() {
            tracing::debug!("no event class subscribed; watcher not started");
            return Ok(());
        }
        for base in self.watch_bases() {
            tracing::info!(
                "watching {} for {}",
                base.display(),
                self.config.glob_pattern
            );
            self.watchers
                .push(FileWatcher::new(&base, &self.config.glob_pattern, mask)?);
        }
        Ok(())
    }

    /// Replaces the configuration and restarts the subscriptions.
    pub fn apply_config(&mut self, config: NotifyConfig) -> Result<()> {
        self.config = config;
        self.start()
    }

    /// Base directories for the watch: the expanded `path` template (no
    /// file context) when configured, else every workspace root, else the
    /// current directory.
    fn watch_bases(&self) -> Vec<PathBuf> {
        if let Some(template) = &self.config.path {
            let ctx = SubstitutionContext::new(&self.roots, None);
            if let Some(expanded) = self.engine.expand(template, &ctx, self.notifier.as_ref()) {
                return vec![PathBuf::from(expanded)];
            }
        }
        if !self.roots.is_empty() {
            return self
                .roots
                .iter()
                .map(|folder| PathBuf::from(&folder.root_path))
                .collect();
        }
        vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]
    }

    /// Next event from any subscription, if one arrives within the
    /// timeout. Sleeps out the timeout when nothing is subscribed so
    /// callers can loop.
    pub fn poll(&self, timeout: Duration) -> Option<FileEvent> {
        match self.watchers.as_slice() {
            [] => {
                std::thread::sleep(timeout);
                None
            }
            [watcher] => watcher.recv_timeout(timeout).ok(),
            watchers => {
                let deadline = Instant::now() + timeout;
                loop {
                    for watcher in watchers {
                        if let Ok(event) = watcher.try_recv() {
                            return Some(event);
                        }
                    }
                    if Instant::now() >= deadline {
                        return None;
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
        }
    }

    /// Runs the action list declared for this event's class, in order,
    /// against the event's file context.
    pub fn handle(&mut self, event: &FileEvent) {
        let Some(list) = self.config.actions_for(event.kind) else {
            return;
        };
        tracing::debug!(
            path = %event.path.display(),
            kind = event.kind.as_str(),
            "dispatching actions"
        );
        let file = event.path.to_string_lossy();
        let ctx = SubstitutionContext::new(&self.roots, Some(file.as_ref()));
        run_actions(
            list,
            &self.engine,
            &ctx,
            &mut self.status_bar,
            self.notifier.as_ref(),
        );
    }

    pub fn status_bar(&self) -> &StatusBar {
        &self.status_bar
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    pub fn roots(&self) -> &WorkspaceRoots {
        &self.roots
    }

    pub fn is_watching(&self) -> bool {
        !self.watchers.is_empty()
    }
}
