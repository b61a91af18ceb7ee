//! Widget lifecycle: creation from templates, id allocation, timer ownership,
//! and removal.
//!
//! DESIGN
//! ======
//! The manager never writes to the store itself. `create_widget` returns the
//! config to ADD, `remove_widget` returns the REMOVE action, and the caller
//! dispatches them. What the manager does own is bookkeeping the store has no
//! place for: the id sequence and the scheduler timers each widget holds, so
//! removal can cancel every one of them before the widget disappears.

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Map;

use crate::consts::GRID_COLUMNS;
use crate::error::ErrorCode;
use crate::registry::{WidgetRegistry, WidgetTemplate};
use crate::scheduler::{Scheduler, TimerId};
use crate::store::{DashboardState, WidgetAction};
use crate::widget::{Position, WidgetConfig, WidgetId, WidgetType};

// =============================================================================
// IDS
// =============================================================================

/// Source of widget ids.
pub trait IdGenerator: Send {
    fn next_id(&mut self, widget_type: &WidgetType) -> WidgetId;
}

/// `{type}-{n}` with one counter shared by every type, starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, widget_type: &WidgetType) -> WidgetId {
        let id = format!("{widget_type}-{}", self.next);
        self.next += 1;
        id
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("unknown widget type: {0}")]
    UnknownType(WidgetType),
    #[error("a {0} widget already exists")]
    SingleInstanceExists(WidgetType),
}

impl ErrorCode for LifecycleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownType(_) => "E_UNKNOWN_WIDGET_TYPE",
            Self::SingleInstanceExists(_) => "E_SINGLE_INSTANCE",
        }
    }
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct WidgetLifecycle {
    registry: WidgetRegistry,
    ids: Box<dyn IdGenerator>,
    timers: BTreeMap<WidgetId, BTreeSet<TimerId>>,
}

impl WidgetLifecycle {
    #[must_use]
    pub fn new(registry: WidgetRegistry, ids: Box<dyn IdGenerator>) -> Self {
        Self { registry, ids, timers: BTreeMap::new() }
    }

    #[must_use]
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Templates that can be instantiated right now. Single-instance types
    /// that already have an instance are left out.
    #[must_use]
    pub fn creatable_templates(&self, state: &DashboardState) -> Vec<&WidgetTemplate> {
        self.registry.templates().filter(|t| t.allow_multiple || !has_instance(state, &t.widget_type)).collect()
    }

    /// Build the config for a new `widget_type` instance, placed below every
    /// existing widget. Width is clamped to the grid.
    ///
    /// # Errors
    ///
    /// `UnknownType` if the type is not registered, `SingleInstanceExists` if
    /// it allows one instance and already has it.
    pub fn create_widget(
        &mut self,
        state: &DashboardState,
        widget_type: &WidgetType,
    ) -> Result<WidgetConfig, LifecycleError> {
        let template = self
            .registry
            .get(widget_type)
            .map(|d| d.template.clone())
            .ok_or_else(|| LifecycleError::UnknownType(widget_type.clone()))?;
        if !template.allow_multiple && has_instance(state, widget_type) {
            return Err(LifecycleError::SingleInstanceExists(widget_type.clone()));
        }

        let mut id = self.ids.next_id(widget_type);
        while state.contains(&id) {
            id = self.ids.next_id(widget_type);
        }

        let y = state.widgets.values().map(|w| w.config.position.bottom()).max().unwrap_or(0);

        Ok(WidgetConfig {
            id,
            widget_type: template.widget_type,
            title: template.title,
            position: Position {
                x: 0,
                y,
                width: template.default_size.width.clamp(1, GRID_COLUMNS),
                height: template.default_size.height.max(1),
            },
            is_visible: true,
            is_minimized: false,
            refresh_interval_ms: template.refresh_interval_ms,
            custom_settings: Map::new(),
        })
    }

    /// Record that `owner` holds `timer`.
    pub fn track_timer(&mut self, owner: &str, timer: TimerId) {
        self.timers.entry(owner.to_string()).or_default().insert(timer);
    }

    /// Drop a timer from `owner`'s set once it has fired or been cancelled.
    pub fn forget_timer(&mut self, owner: &str, timer: TimerId) {
        if let Some(set) = self.timers.get_mut(owner) {
            set.remove(&timer);
            if set.is_empty() {
                self.timers.remove(owner);
            }
        }
    }

    #[must_use]
    pub fn timers_for(&self, owner: &str) -> Vec<TimerId> {
        self.timers.get(owner).map(|set| set.iter().copied().collect()).unwrap_or_default()
    }

    /// Cancel every timer `id` owns and return the action that removes it.
    pub fn remove_widget(&mut self, id: &str, scheduler: &mut dyn Scheduler) -> WidgetAction {
        if let Some(timers) = self.timers.remove(id) {
            for timer in timers {
                scheduler.cancel(timer);
            }
        }
        WidgetAction::RemoveWidget { id: id.to_string() }
    }

    /// Cancel every tracked timer, for all widgets.
    pub fn cancel_all(&mut self, scheduler: &mut dyn Scheduler) {
        for timer in std::mem::take(&mut self.timers).into_values().flatten() {
            scheduler.cancel(timer);
        }
    }
}

fn has_instance(state: &DashboardState, widget_type: &WidgetType) -> bool {
    state.widgets.values().any(|w| w.config.widget_type == *widget_type)
}
