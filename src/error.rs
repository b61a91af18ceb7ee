//! Error taxonomy shared across the dashboard crate.
//!
//! Each module owns a `thiserror` enum for its own failures. All of them
//! implement [`ErrorCode`] so the coordinator can log a stable machine code
//! next to the human message, and the boundary can ask whether a failure is
//! worth retrying.

use crate::kanban::MoveRejection;
use crate::lifecycle::LifecycleError;
use crate::milestone::ValidationError;
use crate::persistence::PersistenceError;
use crate::provider::FetchError;
use crate::widget::WidgetType;

/// Stable code attached to every error the crate surfaces.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Top-level error returned by [`crate::dashboard::Dashboard`] operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("widget not found: {0}")]
    UnknownWidget(String),
    #[error("widget {0} is not a roadmap board")]
    NotABoard(String),
    #[error("no data provider registered for {0}")]
    NoProvider(WidgetType),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Move(#[from] MoveRejection),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ErrorCode for DashboardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownWidget(_) => "E_UNKNOWN_WIDGET",
            Self::NotABoard(_) => "E_NOT_A_BOARD",
            Self::NoProvider(_) => "E_NO_PROVIDER",
            Self::Lifecycle(e) => e.error_code(),
            Self::Move(e) => e.error_code(),
            Self::Fetch(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Persistence(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.retryable(),
            _ => false,
        }
    }
}
