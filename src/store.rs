//! Widget state store: the single source of truth for every widget instance.
//!
//! DESIGN
//! ======
//! [`reduce`] is a pure function from `(state, action)` to a new state. It
//! never logs, reads the clock, or touches anything outside its arguments,
//! so replaying the same actions from the same state always yields the same
//! result. [`WidgetStore`] wraps it with the side effects: it logs ignored
//! actions and counts revisions.
//!
//! Widgets are stored as `Arc<WidgetRuntimeState>` in a `BTreeMap`. A
//! reduction clones the map (cheap: it copies pointers) and replaces only the
//! entry it changes, so an untouched widget keeps pointer identity and
//! views can detect change with `Arc::ptr_eq`. The ordered map keeps
//! iteration and serialization deterministic.
//!
//! ORPHANS
//! =======
//! Fetches are never cancelled, so a completion may arrive after its widget
//! was removed. Every mutation of an unknown id is ignored, leaving the state
//! exactly as it was.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::Level;

use crate::consts::COMPONENT_STORE;
use crate::logging::SharedSink;
use crate::widget::{PartialWidgetConfig, WidgetConfig, WidgetData, WidgetId, WidgetRuntimeState};

// =============================================================================
// ACTIONS
// =============================================================================

/// Every way the store can change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WidgetAction {
    AddWidget { id: WidgetId, config: WidgetConfig },
    RemoveWidget { id: WidgetId },
    UpdateWidgetConfig { id: WidgetId, partial: PartialWidgetConfig },
    UpdateWidgetData { id: WidgetId, data: WidgetData },
    SetWidgetLoading { id: WidgetId, loading: bool },
    SetWidgetError { id: WidgetId, error: Option<String> },
    ReorderWidgets { order: Vec<WidgetId> },
}

impl WidgetAction {
    /// Wire name, e.g. `"ADD_WIDGET"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddWidget { .. } => "ADD_WIDGET",
            Self::RemoveWidget { .. } => "REMOVE_WIDGET",
            Self::UpdateWidgetConfig { .. } => "UPDATE_WIDGET_CONFIG",
            Self::UpdateWidgetData { .. } => "UPDATE_WIDGET_DATA",
            Self::SetWidgetLoading { .. } => "SET_WIDGET_LOADING",
            Self::SetWidgetError { .. } => "SET_WIDGET_ERROR",
            Self::ReorderWidgets { .. } => "REORDER_WIDGETS",
        }
    }

    /// Target widget, if the action has one.
    #[must_use]
    pub fn widget_id(&self) -> Option<&str> {
        match self {
            Self::AddWidget { id, .. }
            | Self::RemoveWidget { id }
            | Self::UpdateWidgetConfig { id, .. }
            | Self::UpdateWidgetData { id, .. }
            | Self::SetWidgetLoading { id, .. }
            | Self::SetWidgetError { id, .. } => Some(id),
            Self::ReorderWidgets { .. } => None,
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

/// All widget runtime state plus display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub widgets: BTreeMap<WidgetId, Arc<WidgetRuntimeState>>,
    pub order: Vec<WidgetId>,
}

impl DashboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<WidgetRuntimeState>> {
        self.widgets.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Widgets in display order. Ids in `order` that are not registered are skipped.
    #[must_use]
    pub fn ordered(&self) -> Vec<&Arc<WidgetRuntimeState>> {
        self.order.iter().filter_map(|id| self.widgets.get(id)).collect()
    }
}

/// True if widget `id` differs between two states (by pointer, not by value).
#[must_use]
pub fn widget_changed(prev: &DashboardState, next: &DashboardState, id: &str) -> bool {
    match (prev.widgets.get(id), next.widgets.get(id)) {
        (Some(a), Some(b)) => !Arc::ptr_eq(a, b),
        (None, None) => false,
        _ => true,
    }
}

// =============================================================================
// REDUCER
// =============================================================================

/// Why an action left the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// ADD_WIDGET for an id that is already registered.
    DuplicateId,
    /// ADD_WIDGET whose `config.id` differs from the action id.
    IdMismatch,
    /// Mutation of an id that is not registered (usually a late completion).
    UnknownWidget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(IgnoreReason),
}

/// Result of one reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub state: DashboardState,
    pub outcome: Outcome,
}

impl Reduction {
    fn applied(state: DashboardState) -> Self {
        Self { state, outcome: Outcome::Applied }
    }

    fn ignored(state: &DashboardState, reason: IgnoreReason) -> Self {
        Self { state: state.clone(), outcome: Outcome::Ignored(reason) }
    }
}

/// Apply `action` to `state`, returning the next state.
#[must_use]
pub fn reduce(state: &DashboardState, action: &WidgetAction) -> Reduction {
    match action {
        WidgetAction::AddWidget { id, config } => {
            if state.contains(id) {
                return Reduction::ignored(state, IgnoreReason::DuplicateId);
            }
            if config.id != *id {
                return Reduction::ignored(state, IgnoreReason::IdMismatch);
            }
            let mut next = state.clone();
            next.widgets.insert(id.clone(), Arc::new(WidgetRuntimeState::new(config.clone())));
            next.order.push(id.clone());
            Reduction::applied(next)
        }
        WidgetAction::RemoveWidget { id } => {
            if !state.contains(id) {
                return Reduction::ignored(state, IgnoreReason::UnknownWidget);
            }
            let mut next = state.clone();
            next.widgets.remove(id);
            next.order.retain(|o| o != id);
            Reduction::applied(next)
        }
        WidgetAction::UpdateWidgetConfig { id, partial } => update(state, id, |w| {
            w.config = partial.apply_to(&w.config);
        }),
        WidgetAction::UpdateWidgetData { id, data } => update(state, id, |w| {
            w.data = Some(data.clone());
            w.is_loading = false;
            w.error = None;
        }),
        WidgetAction::SetWidgetLoading { id, loading } => update(state, id, |w| {
            w.is_loading = *loading;
        }),
        WidgetAction::SetWidgetError { id, error } => update(state, id, |w| {
            w.error.clone_from(error);
            if error.is_some() {
                w.is_loading = false;
            }
        }),
        WidgetAction::ReorderWidgets { order } => {
            let mut next = state.clone();
            next.order.clone_from(order);
            Reduction::applied(next)
        }
    }
}

/// Replace widget `id` with an edited copy.
fn update(state: &DashboardState, id: &str, edit: impl FnOnce(&mut WidgetRuntimeState)) -> Reduction {
    let Some(current) = state.widgets.get(id) else {
        return Reduction::ignored(state, IgnoreReason::UnknownWidget);
    };
    let mut widget = WidgetRuntimeState::clone(current);
    edit(&mut widget);

    let mut next = state.clone();
    next.widgets.insert(id.to_string(), Arc::new(widget));
    Reduction::applied(next)
}

// =============================================================================
// STORE
// =============================================================================

/// Owns the current [`DashboardState`] and serializes all writes through [`reduce`].
pub struct WidgetStore {
    state: DashboardState,
    revision: u64,
    sink: SharedSink,
}

impl WidgetStore {
    #[must_use]
    pub fn new(sink: SharedSink) -> Self {
        Self { state: DashboardState::new(), revision: 0, sink }
    }

    /// Apply one action. Returns `true` if the state changed.
    pub fn dispatch(&mut self, action: WidgetAction) -> bool {
        let Reduction { state, outcome } = reduce(&self.state, &action);
        match outcome {
            Outcome::Applied => {
                self.state = state;
                self.revision += 1;
                true
            }
            Outcome::Ignored(reason) => {
                self.log_ignored(&action, reason);
                false
            }
        }
    }

    fn log_ignored(&self, action: &WidgetAction, reason: IgnoreReason) {
        let payload = json!({ "action": action.name(), "id": action.widget_id() });
        match reason {
            IgnoreReason::DuplicateId => {
                self.sink.log(Level::WARN, COMPONENT_STORE, "widget id already registered", &payload);
            }
            IgnoreReason::IdMismatch => {
                self.sink.log(Level::WARN, COMPONENT_STORE, "widget config id does not match action id", &payload);
            }
            IgnoreReason::UnknownWidget => {
                self.sink.log(Level::DEBUG, COMPONENT_STORE, "dropped update for unknown widget", &payload);
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Cheap copy of the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.state.clone()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<WidgetRuntimeState>> {
        self.state.get(id)
    }

    #[must_use]
    pub fn ordered_widgets(&self) -> Vec<&Arc<WidgetRuntimeState>> {
        self.state.ordered()
    }

    /// Number of applied actions since creation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
