//! Persistence port: dashboard layouts and board contents as JSON snapshots.
//!
//! A snapshot holds what a user would expect to survive a reload: widget
//! configs, display order, and every roadmap board. Runtime flags (loading,
//! errors, boundary state) and opaque provider payloads are not persisted;
//! providers refetch those.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ErrorCode;
use crate::kanban::RoadmapBoard;
use crate::store::DashboardState;
use crate::widget::{WidgetConfig, WidgetData, WidgetId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub widgets: Vec<WidgetConfig>,
    pub order: Vec<WidgetId>,
    #[serde(default)]
    pub boards: BTreeMap<WidgetId, RoadmapBoard>,
}

impl DashboardSnapshot {
    /// Capture configs, order, and boards from `state`. Widgets are listed in
    /// display order, then any not in the order list by id.
    #[must_use]
    pub fn capture(state: &DashboardState) -> Self {
        let mut widgets: Vec<WidgetConfig> = state.ordered().iter().map(|w| w.config.clone()).collect();
        for (id, w) in &state.widgets {
            if !state.order.contains(id) {
                widgets.push(w.config.clone());
            }
        }

        let boards = state
            .widgets
            .iter()
            .filter_map(|(id, w)| match &w.data {
                Some(WidgetData::Roadmap(board)) => Some((id.clone(), board.clone())),
                _ => None,
            })
            .collect();

        Self { widgets, order: state.order.clone(), boards }
    }

    /// # Errors
    ///
    /// `Serialize` if encoding fails.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    ///
    /// `Serialize` if `raw` is not a valid snapshot.
    pub fn from_json(raw: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("snapshot encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("snapshot storage failed: {0}")]
    Storage(String),
}

impl ErrorCode for PersistenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Serialize(_) => "E_SERIALIZE",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Keyed snapshot storage.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, key: &str, snapshot: &DashboardSnapshot) -> Result<(), PersistenceError>;

    /// `Ok(None)` if nothing is stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<DashboardSnapshot>, PersistenceError>;
}

/// Process-local store. Keeps encoded JSON so save/load exercise the same
/// encoding a durable backend would.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored JSON for `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, key: &str, snapshot: &DashboardSnapshot) -> Result<(), PersistenceError> {
        let raw = snapshot.to_json()?;
        self.entries.lock().await.insert(key.to_string(), raw);
        tracing::debug!(key, "snapshot saved");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<DashboardSnapshot>, PersistenceError> {
        match self.entries.lock().await.get(key) {
            Some(raw) => DashboardSnapshot::from_json(raw).map(Some),
            None => Ok(None),
        }
    }
}
