//! Widget model: configuration, type tags, payloads, and runtime state.
//!
//! This module defines what a dashboard card *is* (`WidgetConfig`), the
//! sparse-update type used to edit it (`PartialWidgetConfig`), the type-tagged
//! payload its data provider produces (`WidgetData`), and the runtime record
//! the store keeps per widget (`WidgetRuntimeState`).
//!
//! `id` and `widget_type` are fixed at creation. `PartialWidgetConfig` has no
//! field for either, so no update path can change them; changing a widget's
//! type means removing it and adding a new one.

#[cfg(test)]
#[path = "widget_test.rs"]
mod widget_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kanban::RoadmapBoard;

/// Unique identifier for a widget instance, e.g. `"roadmap-board-1"`.
pub type WidgetId = String;

// =============================================================================
// WIDGET TYPE
// =============================================================================

pub const ACTIVITY_FEED: &str = "activity-feed";
pub const SKILL_RADAR: &str = "skill-radar";
pub const ROADMAP_BOARD: &str = "roadmap-board";
pub const DOCUMENT_REVIEWER: &str = "document-reviewer";
pub const MARKET_INSIGHTS: &str = "market-insights";
pub const RESOURCE_LIST: &str = "resource-list";

/// Type tag of a widget. Open set: any tag registered in the
/// [`crate::registry::WidgetRegistry`] is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetType(String);

impl WidgetType {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn roadmap_board() -> Self {
        Self::new(ROADMAP_BOARD)
    }

    #[must_use]
    pub fn is_roadmap_board(&self) -> bool {
        self.0 == ROADMAP_BOARD
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Grid placement in dashboard grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Position {
    /// Grid row just below this widget.
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}

/// Identity and presentation metadata for one dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub title: String,
    pub position: Position,
    pub is_visible: bool,
    pub is_minimized: bool,
    /// Auto-refresh period; `0` disables auto refresh.
    pub refresh_interval_ms: u64,
    #[serde(default)]
    pub custom_settings: Map<String, Value>,
}

/// Sparse update for a widget config. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialWidgetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_minimized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval_ms: Option<u64>,
    /// Settings keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_settings: Option<Map<String, Value>>,
}

impl PartialWidgetConfig {
    /// Return a new config with this update applied. `id` and type are carried over.
    #[must_use]
    pub fn apply_to(&self, config: &WidgetConfig) -> WidgetConfig {
        let mut next = config.clone();
        if let Some(title) = &self.title {
            next.title.clone_from(title);
        }
        if let Some(position) = self.position {
            next.position = position;
        }
        if let Some(visible) = self.is_visible {
            next.is_visible = visible;
        }
        if let Some(minimized) = self.is_minimized {
            next.is_minimized = minimized;
        }
        if let Some(interval) = self.refresh_interval_ms {
            next.refresh_interval_ms = interval;
        }
        if let Some(settings) = &self.custom_settings {
            for (k, v) in settings {
                if v.is_null() {
                    next.custom_settings.remove(k);
                } else {
                    next.custom_settings.insert(k.clone(), v.clone());
                }
            }
        }
        next
    }

    /// True if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// DATA
// =============================================================================

/// Type-tagged payload produced by a widget's data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum WidgetData {
    /// Milestones and columns of a roadmap board.
    Roadmap(RoadmapBoard),
    /// Payload the framework does not interpret.
    Opaque(Value),
}

impl WidgetData {
    /// The roadmap board, if this is one.
    #[must_use]
    pub fn as_roadmap(&self) -> Option<&RoadmapBoard> {
        match self {
            Self::Roadmap(board) => Some(board),
            Self::Opaque(_) => None,
        }
    }
}

// =============================================================================
// RUNTIME STATE
// =============================================================================

/// Everything the store knows about one registered widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRuntimeState {
    pub config: WidgetConfig,
    pub data: Option<WidgetData>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl WidgetRuntimeState {
    /// Fresh state for a newly added widget: no data, not loading, no error.
    #[must_use]
    pub fn new(config: WidgetConfig) -> Self {
        Self { config, data: None, is_loading: false, error: None }
    }
}
