//! Fixtures shared by the unit tests.

use serde_json::Map;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::kanban::{Column, RoadmapBoard};
use crate::milestone::{Milestone, MilestoneStatus};
use crate::widget::{Position, WidgetConfig, WidgetType};

/// Fixed instant used wherever a transition needs "now".
pub const NOW: OffsetDateTime = datetime!(2026-03-14 09:30:00 UTC);

/// A visible widget config at the origin.
#[must_use]
pub fn widget_config(id: &str, widget_type: &str) -> WidgetConfig {
    WidgetConfig {
        id: id.to_string(),
        widget_type: WidgetType::new(widget_type),
        title: format!("{widget_type} widget"),
        position: Position { x: 0, y: 0, width: 4, height: 3 },
        is_visible: true,
        is_minimized: false,
        refresh_interval_ms: 0,
        custom_settings: Map::new(),
    }
}

/// A milestone in `status` with zero progress and 10 estimated hours.
#[must_use]
pub fn milestone(id: &str, status: MilestoneStatus) -> Milestone {
    let mut m = Milestone::new(id, format!("Milestone {id}"), status);
    m.estimated_hours = 10.0;
    m.category = "general".into();
    if status == MilestoneStatus::Completed {
        m.progress = 100;
        m.completed_date = Some(NOW);
    }
    m
}

/// Board with the default columns holding `milestones`.
#[must_use]
pub fn board(milestones: Vec<Milestone>) -> RoadmapBoard {
    RoadmapBoard { columns: Column::defaults(), milestones }
}

/// Board whose `review` column has `limit` and is already full, plus one
/// milestone `"mover"` waiting in `in-progress`.
#[must_use]
pub fn board_with_full_review(limit: usize) -> RoadmapBoard {
    let mut milestones: Vec<Milestone> = (0..limit)
        .map(|i| milestone(&format!("r{i}"), MilestoneStatus::Review))
        .collect();
    milestones.push(milestone("mover", MilestoneStatus::InProgress));
    let mut b = board(milestones);
    for column in &mut b.columns {
        if column.id == MilestoneStatus::Review {
            column.limit = Some(limit);
        }
    }
    b
}
