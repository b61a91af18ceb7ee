//! Loading placeholders and view selection.
//!
//! [`render_view`] turns a widget's store state plus its boundary state into
//! the one thing a renderer should draw. Placeholder shapes come from the
//! registry so each widget type gets a skeleton resembling its content.

#[cfg(test)]
#[path = "skeleton_test.rs"]
mod skeleton_test;

use serde::{Deserialize, Serialize};

use crate::boundary::{BoundaryView, FaultCard};
use crate::registry::WidgetRegistry;
use crate::widget::{WidgetData, WidgetRuntimeState};

/// Placeholder layout shown while a widget has no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum SkeletonShape {
    Chart,
    List { rows: u8 },
    Document { lines: u8 },
    Board { columns: u8, cards: u8 },
    /// Generic block for types without a dedicated shape.
    Card,
}

/// What to draw for one widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "detail", rename_all = "lowercase")]
pub enum WidgetView {
    Hidden,
    Faulted(FaultCard),
    Minimized { title: String },
    Skeleton(SkeletonShape),
    Error { message: String },
    Content(WidgetData),
}

/// Pick the view for a widget.
///
/// Priority: hidden, boundary fault, minimized, skeleton (loading or no data
/// yet), store error, content.
#[must_use]
pub fn render_view(state: &WidgetRuntimeState, boundary: &BoundaryView, registry: &WidgetRegistry) -> WidgetView {
    if !state.config.is_visible {
        return WidgetView::Hidden;
    }
    if let BoundaryView::Faulted(card) = boundary {
        return WidgetView::Faulted(card.clone());
    }
    if state.config.is_minimized {
        return WidgetView::Minimized { title: state.config.title.clone() };
    }
    if state.is_loading {
        return WidgetView::Skeleton(registry.skeleton_for(&state.config.widget_type));
    }
    if let Some(message) = &state.error {
        return WidgetView::Error { message: message.clone() };
    }
    match &state.data {
        Some(data) => WidgetView::Content(data.clone()),
        None => WidgetView::Skeleton(registry.skeleton_for(&state.config.widget_type)),
    }
}
