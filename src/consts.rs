//! Shared constants for the dashboard crate.

// ── Retry ───────────────────────────────────────────────────────

/// Automatic retries an error boundary attempts before going terminal.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Backoff base in milliseconds; attempt `n` waits `2^n * base`.
pub const DEFAULT_RETRY_BASE_MS: u64 = 1000;

/// Message fragments that mark a fault as transient.
pub const DEFAULT_RETRY_PATTERNS: &[&str] = &["network", "fetch", "timeout", "connection", "temporary"];

// ── Milestones ──────────────────────────────────────────────────

/// Estimated hours given to a milestone created from an empty column slot.
pub const DEFAULT_ESTIMATED_HOURS: f64 = 10.0;

/// Progress assigned when untouched work first enters `in-progress`.
pub const STARTED_PROGRESS: u8 = 25;

/// Progress of a finished milestone.
pub const COMPLETE_PROGRESS: u8 = 100;

/// Inclusive difficulty range.
pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

// ── Layout ──────────────────────────────────────────────────────

/// Width of the dashboard grid in columns.
pub const GRID_COLUMNS: u32 = 12;

// ── Log components ──────────────────────────────────────────────

pub const COMPONENT_STORE: &str = "store";
pub const COMPONENT_LIFECYCLE: &str = "lifecycle";
pub const COMPONENT_KANBAN: &str = "kanban";
pub const COMPONENT_BOUNDARY: &str = "boundary";
pub const COMPONENT_DASHBOARD: &str = "dashboard";
