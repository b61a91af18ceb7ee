//! Kanban board engine for the roadmap widget.
//!
//! DESIGN
//! ======
//! A board is a flat milestone list plus column definitions. Columns do not
//! store membership: a column's milestones are the list filtered on
//! `status == column.id`, in list order. Status and column membership
//! therefore cannot drift apart, and moving a milestone is "transition its
//! status, then reinsert it at the right place in the list".
//!
//! Every operation is pure: it borrows the current board and returns a new
//! one (or a [`MoveRejection`] with the board untouched). The dashboard
//! commits the result to the store as a single UPDATE_WIDGET_DATA.
//!
//! WIP LIMITS
//! ==========
//! A move into a different column is rejected outright when that column has
//! a limit and already holds `limit` milestones. Reordering inside a column
//! never checks the limit.

#[cfg(test)]
#[path = "kanban_test.rs"]
mod kanban_test;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::consts::COMPLETE_PROGRESS;
use crate::error::ErrorCode;
use crate::milestone::{Milestone, MilestoneStatus, ValidationError, transition};

// =============================================================================
// TYPES
// =============================================================================

/// A status bucket on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: MilestoneStatus,
    pub title: String,
    /// Maximum milestones allowed; `None` is unconstrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    pub color: String,
}

impl Column {
    /// The standard four columns.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(MilestoneStatus::Backlog, "Backlog", None, "#6b7280"),
            Self::new(MilestoneStatus::InProgress, "In Progress", Some(3), "#3b82f6"),
            Self::new(MilestoneStatus::Review, "Review", Some(5), "#f59e0b"),
            Self::new(MilestoneStatus::Completed, "Completed", None, "#10b981"),
        ]
    }

    fn new(id: MilestoneStatus, title: &str, limit: Option<usize>, color: &str) -> Self {
        Self { id, title: title.to_string(), limit, color: color.to_string() }
    }
}

/// Milestones and columns of one roadmap widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapBoard {
    pub columns: Vec<Column>,
    pub milestones: Vec<Milestone>,
}

impl Default for RoadmapBoard {
    fn default() -> Self {
        Self { columns: Column::defaults(), milestones: Vec::new() }
    }
}

/// A completed drag gesture, as reported by the drag-and-drop layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub milestone_id: String,
    pub source: String,
    pub destination: String,
    /// Final index within the destination column.
    pub dest_index: usize,
}

impl DragEnd {
    #[must_use]
    pub fn new(milestone_id: &str, source: MilestoneStatus, destination: MilestoneStatus, dest_index: usize) -> Self {
        Self {
            milestone_id: milestone_id.to_string(),
            source: source.as_str().to_string(),
            destination: destination.as_str().to_string(),
            dest_index,
        }
    }
}

/// Derived per-column figures. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: MilestoneStatus,
    pub count: usize,
    pub total_estimated_hours: f64,
    /// Mean progress; `0.0` for an empty column.
    pub average_progress: f64,
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub board: RoadmapBoard,
    /// The milestone after its transition.
    pub milestone: Milestone,
    pub stats: Vec<ColumnStats>,
}

/// Why the board refused a move or insert. The board is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("unknown milestone: {0}")]
    UnknownMilestone(String),
    #[error("milestone {id} is in {actual}, not {claimed}")]
    SourceMismatch { id: String, claimed: MilestoneStatus, actual: MilestoneStatus },
    #[error("milestone {0} is already at that position")]
    UnchangedPosition(String),
    #[error("column {column} is at its WIP limit of {limit}")]
    WipLimitExceeded { column: MilestoneStatus, limit: usize },
}

impl ErrorCode for MoveRejection {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownColumn(_) => "E_UNKNOWN_COLUMN",
            Self::UnknownMilestone(_) => "E_UNKNOWN_MILESTONE",
            Self::SourceMismatch { .. } => "E_SOURCE_MISMATCH",
            Self::UnchangedPosition(_) => "E_UNCHANGED_POSITION",
            Self::WipLimitExceeded { .. } => "E_WIP_LIMIT",
        }
    }
}

// =============================================================================
// QUERIES
// =============================================================================

impl RoadmapBoard {
    /// Column definition for `status`, if the board has one.
    #[must_use]
    pub fn column(&self, status: MilestoneStatus) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == status)
    }

    /// Milestones in `status`, in display order.
    #[must_use]
    pub fn milestones_in(&self, status: MilestoneStatus) -> Vec<&Milestone> {
        self.milestones.iter().filter(|m| m.status == status).collect()
    }

    #[must_use]
    pub fn milestone(&self, id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == id)
    }

    /// Statistics for every column, in column order.
    #[must_use]
    pub fn column_stats(&self) -> Vec<ColumnStats> {
        self.columns
            .iter()
            .map(|column| {
                let members = self.milestones_in(column.id);
                let count = members.len();
                let total_estimated_hours = members.iter().map(|m| m.estimated_hours).sum();
                let total_progress: f64 = members.iter().map(|m| f64::from(m.progress)).sum();
                #[allow(clippy::cast_precision_loss)]
                let average_progress = if count == 0 { 0.0 } else { total_progress / count as f64 };
                ColumnStats { column: column.id, count, total_estimated_hours, average_progress }
            })
            .collect()
    }

    /// Check structural invariants: unique columns, unique milestone ids,
    /// every milestone valid and sitting in an existing column.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.id == column.id) {
                return Err(ValidationError::DuplicateColumn(column.id));
            }
        }
        for (i, m) in self.milestones.iter().enumerate() {
            if self.milestones[..i].iter().any(|other| other.id == m.id) {
                return Err(ValidationError::DuplicateMilestone(m.id.clone()));
            }
            if self.column(m.status).is_none() {
                return Err(ValidationError::MissingColumn { id: m.id.clone(), status: m.status });
            }
            m.validate()?;
        }
        Ok(())
    }

    fn parse_column(&self, raw: &str) -> Result<&Column, MoveRejection> {
        let status: MilestoneStatus = raw.parse().map_err(|_| MoveRejection::UnknownColumn(raw.to_string()))?;
        self.column(status)
            .ok_or_else(|| MoveRejection::UnknownColumn(raw.to_string()))
    }

    fn check_wip(&self, column: &Column) -> Result<(), MoveRejection> {
        match column.limit {
            Some(limit) if self.milestones_in(column.id).len() >= limit => {
                Err(MoveRejection::WipLimitExceeded { column: column.id, limit })
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// MUTATIONS
// =============================================================================

impl RoadmapBoard {
    /// Apply a drag gesture.
    ///
    /// # Errors
    ///
    /// Rejects unknown columns or milestones, a source column that does not
    /// match the milestone's status, a drop back onto the same slot, and a
    /// cross-column drop into a column at its WIP limit.
    pub fn move_milestone(&self, drag: &DragEnd, now: OffsetDateTime) -> Result<MoveOutcome, MoveRejection> {
        let source = self.parse_column(&drag.source)?.id;
        let destination = self.parse_column(&drag.destination)?;

        let Some(pos) = self.milestones.iter().position(|m| m.id == drag.milestone_id) else {
            return Err(MoveRejection::UnknownMilestone(drag.milestone_id.clone()));
        };
        let current = &self.milestones[pos];
        if current.status != source {
            return Err(MoveRejection::SourceMismatch {
                id: current.id.clone(),
                claimed: source,
                actual: current.status,
            });
        }

        if source == destination.id {
            let members = self.milestones_in(source);
            let from_index = members.iter().position(|m| m.id == current.id);
            let to_index = drag.dest_index.min(members.len().saturating_sub(1));
            if from_index == Some(to_index) {
                return Err(MoveRejection::UnchangedPosition(current.id.clone()));
            }
        } else {
            self.check_wip(destination)?;
        }

        let moved = transition(current, destination.id, now);
        let mut milestones = self.milestones.clone();
        milestones.remove(pos);
        let at = insertion_index(&milestones, destination.id, drag.dest_index);
        milestones.insert(at, moved.clone());

        let board = Self { columns: self.columns.clone(), milestones };
        let stats = board.column_stats();
        Ok(MoveOutcome { board, milestone: moved, stats })
    }

    /// Move a milestone one step along the forward flow, to the end of the
    /// next column.
    ///
    /// # Errors
    ///
    /// Same rejections as [`RoadmapBoard::move_milestone`]; a completed
    /// milestone reports `UnchangedPosition`.
    pub fn advance_milestone(&self, id: &str, now: OffsetDateTime) -> Result<MoveOutcome, MoveRejection> {
        let Some(current) = self.milestone(id) else {
            return Err(MoveRejection::UnknownMilestone(id.to_string()));
        };
        let Some(next) = current.status.next() else {
            return Err(MoveRejection::UnchangedPosition(id.to_string()));
        };
        let drag = DragEnd::new(id, current.status, next, self.milestones_in(next).len());
        self.move_milestone(&drag, now)
    }

    /// Append a new milestone to `column_id` with default metadata.
    ///
    /// The milestone starts with zero progress and empty lists; one created
    /// straight into `completed` is stamped complete.
    ///
    /// # Errors
    ///
    /// Rejects unknown columns and columns at their WIP limit.
    pub fn create_milestone(
        &self,
        column_id: &str,
        title: &str,
        estimated_hours: f64,
        now: OffsetDateTime,
    ) -> Result<(Self, Milestone), MoveRejection> {
        let column = self.parse_column(column_id)?;
        self.check_wip(column)?;

        let mut milestone = Milestone::new(Uuid::new_v4().to_string(), title, column.id);
        milestone.estimated_hours = estimated_hours;
        milestone.category = "general".into();
        if column.id == MilestoneStatus::Completed {
            milestone.progress = COMPLETE_PROGRESS;
            milestone.completed_date = Some(now);
        }

        let mut milestones = self.milestones.clone();
        milestones.push(milestone.clone());
        Ok((Self { columns: self.columns.clone(), milestones }, milestone))
    }
}

/// Index in the flat list at which a milestone lands so that it becomes the
/// `dest_index`-th member of `status` (clamped to the end of the column).
fn insertion_index(milestones: &[Milestone], status: MilestoneStatus, dest_index: usize) -> usize {
    let members: Vec<usize> = milestones
        .iter()
        .enumerate()
        .filter(|(_, m)| m.status == status)
        .map(|(i, _)| i)
        .collect();
    match members.get(dest_index) {
        Some(&i) => i,
        None => members.last().map_or(milestones.len(), |&i| i + 1),
    }
}
