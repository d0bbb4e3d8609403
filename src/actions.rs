//! Action dispatch and host sinks
//!
//! The dispatcher walks a declared action list strictly in order: show or
//! remove a status-bar indicator, emit a substituted notification. The
//! host surfaces live behind two narrow traits so the dispatch and
//! substitution logic carries no host dependency.

use std::collections::HashMap;

use crate::config::Action;
use crate::subst::{SubstitutionContext, SubstitutionEngine};

/// User-visible message surface.
pub trait NotificationSink {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Renders messages through the tracing subscriber.
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Style fields applied to an indicator. Absent fields leave the current
/// value untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorUpdate<'a> {
    pub background_color: Option<&'a str>,
    pub color: Option<&'a str>,
    pub name: Option<&'a str>,
    pub text: Option<&'a str>,
    pub tooltip: Option<&'a str>,
}

impl<'a> IndicatorUpdate<'a> {
    pub fn from_action(action: &'a Action) -> Self {
        Self {
            background_color: action.background_color.as_deref(),
            color: action.color.as_deref(),
            name: action.name.as_deref(),
            text: action.text.as_deref(),
            tooltip: action.tooltip.as_deref(),
        }
    }
}

/// Persistent indicator surface keyed by id.
pub trait IndicatorSink {
    /// Creates or reuses the indicator, merges the update, makes it
    /// visible.
    fn show(&mut self, id: &str, update: &IndicatorUpdate<'_>);
    /// Hides and disposes the indicator; a later `show` with the same id
    /// starts from a fresh one.
    fn remove(&mut self, id: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusItem {
    pub background_color: Option<String>,
    pub color: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub tooltip: Option<String>,
    pub visible: bool,
}

/// In-memory indicator registry. The one shared mutable resource of the
/// dispatcher; only ever touched sequentially from one event's action
/// list.
#[derive(Debug, Default)]
pub struct StatusBar {
    items: HashMap<String, StatusItem>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self, id: &str) -> Option<&StatusItem> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IndicatorSink for StatusBar {
    fn show(&mut self, id: &str, update: &IndicatorUpdate<'_>) {
        let item = self.items.entry(id.to_string()).or_default();
        if let Some(value) = update.background_color {
            item.background_color = Some(value.to_string());
        }
        if let Some(value) = update.color {
            item.color = Some(value.to_string());
        }
        if let Some(value) = update.name {
            item.name = Some(value.to_string());
        }
        if let Some(value) = update.text {
            item.text = Some(value.to_string());
        }
        if let Some(value) = update.tooltip {
            item.tooltip = Some(value.to_string());
        }
        item.visible = true;
        tracing::debug!(id, text = item.text.as_deref().unwrap_or(""), "status item shown");
    }

    fn remove(&mut self, id: &str) {
        if self.items.remove(id).is_some() {
            tracing::debug!(id, "status item removed");
        }
    }
}

/// Processes one action list in declared order. A failure inside one
/// action (an unresolved placeholder, a missing workspace) never stops
/// the later actions.
pub fn run_actions(
    list: &[Action],
    engine: &SubstitutionEngine,
    ctx: &SubstitutionContext<'_>,
    indicators: &mut dyn IndicatorSink,
    notifier: &dyn NotificationSink,
) {
    for action in list {
        if let Some(id) = &action.show_status_bar_item {
            indicators.show(id, &IndicatorUpdate::from_action(action));
        }
        if let Some(id) = &action.remove_status_bar_item {
            indicators.remove(id);
        }
        if let Some(template) = &action.notify {
            if let Some(message) = engine.expand(template, ctx, notifier) {
                notifier.info(&message);
            }
        }
    }
}
