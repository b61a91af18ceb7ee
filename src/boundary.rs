//! Per-widget error recovery boundary.
//!
//! DESIGN
//! ======
//! Each widget owns one [`ErrorBoundary`]. A fault (render or data fetch) is
//! classified by [`RetryPolicy::classify`]: messages naming a transient
//! condition are retryable, everything else waits for the user.
//!
//! A retryable fault with `retry_count < max_retries` schedules an automatic
//! retry after `2^retry_count * base`. When that timer fires the fault is
//! cleared and the counter goes up; the next fault backs off further. Once the
//! counter reaches `max_retries` no more timers are scheduled and the fault
//! card offers only dismiss. The counter measures one fault streak: a
//! successful fetch with no fault held ends the streak and zeroes it.
//!
//! A pending retry remembers whether any fault it covers was a fetch failure,
//! so a render fault arriving in the meantime cannot turn the retry into a
//! re-render that leaves the fetch error behind.
//!
//! The boundary never calls back into the dashboard. It hands out decisions
//! and the dashboard acts on them, so a fault in one widget cannot reach any
//! other widget's state.

#[cfg(test)]
#[path = "boundary_test.rs"]
mod boundary_test;

use std::time::Duration;

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::scheduler::{Scheduler, TimerId};
use crate::widget::WidgetId;

// =============================================================================
// POLICY
// =============================================================================

/// Whether a fault may be retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultClass {
    Retryable,
    Terminal,
}

/// Retry budget, backoff base, and the message fragments that mark a fault
/// as transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base: Duration,
    /// Lowercase fragments matched against the lowercased message.
    pub patterns: Vec<String>,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base: config.retry_base,
            patterns: config.retry_patterns.clone(),
        }
    }

    #[must_use]
    pub fn classify(&self, message: &str) -> FaultClass {
        let lower = message.to_lowercase();
        if self.patterns.iter().any(|p| lower.contains(p.as_str())) {
            FaultClass::Retryable
        } else {
            FaultClass::Terminal
        }
    }

    /// Delay before the automatic retry that follows `retry_count` earlier ones.
    #[must_use]
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let factor = 1u32.checked_shl(retry_count).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

// =============================================================================
// FAULTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultKind {
    Render,
    DataFetch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
    pub class: FaultClass,
}

/// What the boundary did with a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// An automatic retry was scheduled.
    Scheduled { timer: TimerId, delay: Duration },
    /// A retry was already pending; it stays as it is.
    AlreadyPending,
    /// The fault is not transient; only a manual retry or dismiss clears it.
    Manual,
    /// The retry budget is spent.
    Exhausted,
}

/// Buttons a fault card offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultAction {
    Retry,
    Dismiss,
}

/// Fallback shown in place of a faulted widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultCard {
    pub kind: FaultKind,
    pub message: String,
    pub retry_count: u32,
    pub max_retries: u32,
    /// Delay of the pending automatic retry, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_in_ms: Option<u64>,
    pub terminal: bool,
    pub actions: Vec<FaultAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum BoundaryView {
    Stable,
    Faulted(FaultCard),
}

// =============================================================================
// BOUNDARY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRetry {
    timer: TimerId,
    delay: Duration,
    /// `DataFetch` if any fault covered by this retry was a fetch failure.
    kind: FaultKind,
}

/// Fault state of one widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBoundary {
    widget_id: WidgetId,
    fault: Option<Fault>,
    retry_count: u32,
    pending: Option<PendingRetry>,
}

impl ErrorBoundary {
    #[must_use]
    pub fn new(widget_id: impl Into<WidgetId>) -> Self {
        Self { widget_id: widget_id.into(), fault: None, retry_count: 0, pending: None }
    }

    #[must_use]
    pub fn widget_id(&self) -> &str {
        &self.widget_id
    }

    #[must_use]
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    #[must_use]
    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending.map(|p| p.timer)
    }

    /// Record a fault and, when allowed, schedule the automatic retry.
    pub fn on_fault(
        &mut self,
        kind: FaultKind,
        message: &str,
        policy: &RetryPolicy,
        scheduler: &mut dyn Scheduler,
    ) -> RetryDecision {
        let class = policy.classify(message);
        self.fault = Some(Fault { kind, message: message.to_string(), class });

        if let Some(pending) = &mut self.pending {
            if kind == FaultKind::DataFetch {
                pending.kind = FaultKind::DataFetch;
            }
            return RetryDecision::AlreadyPending;
        }
        if class == FaultClass::Terminal {
            return RetryDecision::Manual;
        }
        if self.retry_count >= policy.max_retries {
            return RetryDecision::Exhausted;
        }

        let delay = policy.delay_for(self.retry_count);
        let timer = scheduler.schedule(&self.widget_id, delay);
        self.pending = Some(PendingRetry { timer, delay, kind });
        RetryDecision::Scheduled { timer, delay }
    }

    /// Handle a fired timer. Returns what the retry must redo when `timer` is
    /// this boundary's pending retry, `None` when it is stale.
    pub fn on_retry_timer(&mut self, timer: TimerId) -> Option<FaultKind> {
        match self.pending {
            Some(p) if p.timer == timer => {
                self.pending = None;
                self.retry_count += 1;
                self.fault = None;
                Some(p.kind)
            }
            _ => None,
        }
    }

    /// A fetch succeeded. Ends the fault streak unless a fault is still held.
    pub fn on_success(&mut self) {
        if self.fault.is_none() && self.pending.is_none() {
            self.retry_count = 0;
        }
    }

    /// User-initiated retry: clear the fault, cancel any pending retry, and
    /// reset the counter. Returns the kind of the cleared fault.
    pub fn manual_retry(&mut self, scheduler: &mut dyn Scheduler) -> Option<FaultKind> {
        self.cancel_pending(scheduler);
        self.retry_count = 0;
        self.fault.take().map(|f| f.kind)
    }

    /// Hide the fault without retrying. The counter is kept.
    pub fn dismiss(&mut self, scheduler: &mut dyn Scheduler) -> bool {
        self.cancel_pending(scheduler);
        self.fault.take().is_some()
    }

    fn cancel_pending(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(p) = self.pending.take() {
            scheduler.cancel(p.timer);
        }
    }

    #[must_use]
    pub fn view(&self, policy: &RetryPolicy) -> BoundaryView {
        let Some(fault) = &self.fault else {
            return BoundaryView::Stable;
        };
        let terminal = fault.class == FaultClass::Retryable
            && self.pending.is_none()
            && self.retry_count >= policy.max_retries;
        let message = if terminal {
            format!("{} (maximum retry attempts reached)", fault.message)
        } else {
            fault.message.clone()
        };
        let actions = if terminal {
            vec![FaultAction::Dismiss]
        } else {
            vec![FaultAction::Retry, FaultAction::Dismiss]
        };
        BoundaryView::Faulted(FaultCard {
            kind: fault.kind,
            message,
            retry_count: self.retry_count,
            max_retries: policy.max_retries,
            retry_in_ms: self.pending.map(|p| u64::try_from(p.delay.as_millis()).unwrap_or(u64::MAX)),
            terminal,
            actions,
        })
    }
}
