//! Notify configuration
//!
//! Schema for the watch declaration: one glob pattern, an optional
//! templated base path, and an ordered action list per event class. Keys
//! are camelCase on the wire (`globPattern`, `showStatusBarItem`, ...);
//! files load as TOML, or JSON when the extension says so. An absent
//! `on*` key means that event class is not subscribed at all.

use std::path::Path;

use anyhow::{Context, Result};
use globset::Glob;
use serde::{Deserialize, Serialize};

use crate::events::FileEventKind;
use crate::watcher::EventMask;

pub const DEFAULT_GLOB_PATTERN: &str = "*.js";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyConfig {
    /// Glob matched against changed file names and base-relative paths.
    pub glob_pattern: String,
    /// Templated base directory for the watch; expanded without a file
    /// context before the watcher starts.
    pub path: Option<String>,
    pub on_create: Option<Vec<Action>>,
    pub on_change: Option<Vec<Action>>,
    pub on_delete: Option<Vec<Action>>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            glob_pattern: DEFAULT_GLOB_PATTERN.to_string(),
            path: None,
            on_create: None,
            on_change: None,
            on_delete: None,
        }
    }
}

/// One declared action. Exactly which of the three verbs apply is decided
/// by which keys are present; the style fields ride along with
/// `showStatusBarItem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Action {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_status_bar_item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_status_bar_item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<String>,
}

impl NotifyConfig {
    /// Load from a TOML file, or JSON when the extension is `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&raw)
                .with_context(|| format!("Invalid JSON config: {}", path.display()))?,
            _ => toml::from_str(&raw)
                .with_context(|| format!("Invalid TOML config: {}", path.display()))?,
        };
        Ok(config)
    }

    pub fn actions_for(&self, kind: FileEventKind) -> Option<&[Action]> {
        match kind {
            FileEventKind::Created => self.on_create.as_deref(),
            FileEventKind::Changed => self.on_change.as_deref(),
            FileEventKind::Deleted => self.on_delete.as_deref(),
        }
    }

    /// Which event classes carry an action list and therefore get
    /// subscribed.
    pub fn subscriptions(&self) -> EventMask {
        EventMask {
            created: self.on_create.is_some(),
            changed: self.on_change.is_some(),
            deleted: self.on_delete.is_some(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.glob_pattern.is_empty() {
            return Err("globPattern must not be empty".to_string());
        }
        Glob::new(&self.glob_pattern)
            .map_err(|err| format!("Invalid globPattern '{}': {}", self.glob_pattern, err))?;
        Ok(())
    }
}
