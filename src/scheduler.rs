//! Scheduler port: delayed, cancelable timers owned by widgets.
//!
//! DESIGN
//! ======
//! Timers carry no callbacks. A scheduler only remembers *who* owns a timer
//! and *when* it is due; when it fires, the owner id comes back as a
//! [`FiredTimer`] and the dashboard decides what to do with it. That keeps
//! the store single-writer: nothing runs "inside" a timer, so there is no
//! reentrant dispatch.
//!
//! Two implementations:
//! - [`VirtualScheduler`]: a virtual clock advanced explicitly by tests, so
//!   backoff intervals can be asserted exactly without sleeping.
//! - [`TokioScheduler`]: real `tokio::time::sleep` tasks that report fired
//!   timers over an unbounded channel.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to a scheduled timer. Never reused within one scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A timer that has come due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    /// Widget id that scheduled the timer.
    pub owner: String,
}

/// Abstract timer service.
pub trait Scheduler {
    /// Schedule a timer owned by `owner` that fires after `delay`.
    fn schedule(&mut self, owner: &str, delay: Duration) -> TimerId;

    /// Cancel a pending timer. Returns `false` if it already fired or was cancelled.
    fn cancel(&mut self, id: TimerId) -> bool;
}

// =============================================================================
// VIRTUAL SCHEDULER
// =============================================================================

/// A timer waiting on the virtual clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub owner: String,
    /// Delay requested at schedule time.
    pub delay: Duration,
    /// Virtual time at which the timer fires.
    pub due: Duration,
}

/// Deterministic scheduler driven by [`VirtualScheduler::advance`].
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerId, PendingTimer>,
}

impl VirtualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Pending timers ordered by due time, then schedule order.
    #[must_use]
    pub fn pending(&self) -> Vec<PendingTimer> {
        let mut timers: Vec<PendingTimer> = self.pending.values().cloned().collect();
        timers.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.id.cmp(&b.id)));
        timers
    }

    /// Pending timers owned by `owner`.
    #[must_use]
    pub fn pending_for(&self, owner: &str) -> Vec<PendingTimer> {
        self.pending()
            .into_iter()
            .filter(|t| t.owner == owner)
            .collect()
    }

    /// Move the virtual clock forward by `by`, returning every timer that came
    /// due, earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<FiredTimer> {
        let target = self.now + by;
        let due: Vec<PendingTimer> = self.pending().into_iter().filter(|t| t.due <= target).collect();

        for timer in &due {
            self.pending.remove(&timer.id);
        }
        self.now = target;

        due.into_iter()
            .map(|t| FiredTimer { id: t.id, owner: t.owner })
            .collect()
    }

    /// Jump straight to the earliest pending timer and fire everything due then.
    pub fn advance_to_next(&mut self) -> Vec<FiredTimer> {
        let Some(next) = self.pending().first().map(|t| t.due) else {
            return Vec::new();
        };
        let by = next.saturating_sub(self.now);
        self.advance(by)
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&mut self, owner: &str, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.insert(
            id,
            PendingTimer { id, owner: owner.to_string(), delay, due: self.now + delay },
        );
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }
}

// =============================================================================
// TOKIO SCHEDULER
// =============================================================================

/// Scheduler backed by tokio timers.
///
/// `schedule` spawns a task and therefore must be called from inside a tokio
/// runtime. Fired timers are collected with [`TokioScheduler::next_fired`].
pub struct TokioScheduler {
    next_id: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    tx: mpsc::UnboundedSender<FiredTimer>,
    rx: mpsc::UnboundedReceiver<FiredTimer>,
}

impl TokioScheduler {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { next_id: 0, tasks: HashMap::new(), tx, rx }
    }

    /// Number of timers scheduled but not yet delivered or cancelled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for the next live timer to fire. Returns `None` once nothing is pending.
    ///
    /// Timers cancelled after their sleep finished but before delivery are
    /// skipped.
    pub async fn next_fired(&mut self) -> Option<FiredTimer> {
        loop {
            if self.tasks.is_empty() {
                return None;
            }
            let fired = self.rx.recv().await?;
            if self.tasks.remove(&fired.id).is_some() {
                return Some(fired);
            }
        }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, owner: &str, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let tx = self.tx.clone();
        let owner = owner.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(FiredTimer { id, owner }).is_err() {
                tracing::debug!(timer = id.0, "scheduler dropped before timer fired");
            }
        });
        self.tasks.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        match self.tasks.remove(&id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
    }
}
