//! Milestone model and its status state machine.
//!
//! STATE MACHINE
//! =============
//! `backlog` → `in-progress` → `review` → `completed` is the normal flow, but
//! the board may move a milestone between any two statuses. What the machine
//! owns is the auto-adjustment applied atomically with a status change:
//!
//! - entering `completed`: progress raised to 100, `completed_date` stamped
//!   if unset;
//! - entering `in-progress` with zero progress: progress set to 25;
//! - leaving `completed`: `completed_date` cleared.
//!
//! Transitions never mutate in place; [`transition`] returns a new milestone.

#[cfg(test)]
#[path = "milestone_test.rs"]
mod milestone_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::consts::{COMPLETE_PROGRESS, MAX_DIFFICULTY, MIN_DIFFICULTY, STARTED_PROGRESS};
use crate::error::ErrorCode;

// =============================================================================
// ENUMS
// =============================================================================

/// Milestone status. Also the id of the board column holding the milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    Backlog,
    InProgress,
    Review,
    Completed,
}

impl MilestoneStatus {
    /// All statuses in board order.
    pub const ALL: [Self; 4] = [Self::Backlog, Self::InProgress, Self::Review, Self::Completed];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Completed => "completed",
        }
    }

    /// Successor under normal forward flow; `None` for `completed`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Backlog => Some(Self::InProgress),
            Self::InProgress => Some(Self::Review),
            Self::Review => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown milestone status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for MilestoneStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|status| status.as_str() == s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Article,
    Video,
    Course,
    Documentation,
    Book,
    Project,
}

/// Typed learning link attached to a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

// =============================================================================
// MILESTONE
// =============================================================================

/// One learning-roadmap unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: MilestoneStatus,
    pub priority: Priority,
    /// 1 (easiest) to 5.
    pub difficulty: u8,
    pub estimated_hours: f64,
    #[serde(default)]
    pub actual_hours: Option<f64>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Percent complete, 0 to 100.
    pub progress: u8,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
}

impl Milestone {
    /// A bare milestone with default metadata and zero progress.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: MilestoneStatus) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status,
            priority: Priority::default(),
            difficulty: MIN_DIFFICULTY,
            estimated_hours: 0.0,
            actual_hours: None,
            skills: Vec::new(),
            prerequisites: Vec::new(),
            resources: Vec::new(),
            progress: 0,
            due_date: None,
            completed_date: None,
            tags: Vec::new(),
            category: String::new(),
        }
    }

    /// Check range and status invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(ValidationError::Difficulty { id: self.id.clone(), difficulty: self.difficulty });
        }
        if self.progress > COMPLETE_PROGRESS {
            return Err(ValidationError::Progress { id: self.id.clone(), progress: self.progress });
        }
        if !is_valid_hours(self.estimated_hours) {
            return Err(ValidationError::Hours { id: self.id.clone(), field: "estimatedHours" });
        }
        if self.actual_hours.is_some_and(|h| !is_valid_hours(h)) {
            return Err(ValidationError::Hours { id: self.id.clone(), field: "actualHours" });
        }
        if self.status == MilestoneStatus::Completed
            && (self.progress != COMPLETE_PROGRESS || self.completed_date.is_none())
        {
            return Err(ValidationError::IncompleteCompletion(self.id.clone()));
        }
        Ok(())
    }
}

fn is_valid_hours(hours: f64) -> bool {
    hours.is_finite() && hours >= 0.0
}

// =============================================================================
// TRANSITION
// =============================================================================

/// Move `milestone` to status `to`, applying the auto-adjustment policy.
///
/// Moving to the current status returns an unchanged copy.
#[must_use]
pub fn transition(milestone: &Milestone, to: MilestoneStatus, now: OffsetDateTime) -> Milestone {
    let mut next = milestone.clone();
    if milestone.status == to {
        return next;
    }

    next.status = to;
    if milestone.status == MilestoneStatus::Completed {
        next.completed_date = None;
    }

    match to {
        MilestoneStatus::Completed => {
            if next.progress < COMPLETE_PROGRESS {
                next.progress = COMPLETE_PROGRESS;
            }
            if next.completed_date.is_none() {
                next.completed_date = Some(now);
            }
        }
        MilestoneStatus::InProgress if next.progress == 0 => {
            next.progress = STARTED_PROGRESS;
        }
        _ => {}
    }

    next
}

// =============================================================================
// ERRORS
// =============================================================================

/// A milestone, board, or widget payload that breaks a model invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("milestone {id}: difficulty {difficulty} outside 1..=5")]
    Difficulty { id: String, difficulty: u8 },
    #[error("milestone {id}: progress {progress} above 100")]
    Progress { id: String, progress: u8 },
    #[error("milestone {id}: {field} must be a non-negative number")]
    Hours { id: String, field: &'static str },
    #[error("milestone {0}: completed without full progress and completion date")]
    IncompleteCompletion(String),
    #[error("duplicate milestone id: {0}")]
    DuplicateMilestone(String),
    #[error("duplicate column: {0}")]
    DuplicateColumn(MilestoneStatus),
    #[error("milestone {id} has status {status} but the board has no such column")]
    MissingColumn { id: String, status: MilestoneStatus },
    #[error("{widget_type} expects a {expected} payload")]
    Payload { widget_type: String, expected: &'static str },
}

impl ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Payload { .. } => "E_INVALID_PAYLOAD",
            Self::DuplicateColumn(_) | Self::MissingColumn { .. } | Self::DuplicateMilestone(_) => "E_INVALID_BOARD",
            _ => "E_INVALID_MILESTONE",
        }
    }
}
