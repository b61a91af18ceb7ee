//! Dashboard coordinator: wires the store, lifecycle, boundaries, board
//! engine, scheduler, and providers together.
//!
//! DESIGN
//! ======
//! `Dashboard` is the only writer to the [`WidgetStore`]. Every operation
//! takes `&mut self`, so dispatches are serialized and never reentrant.
//! Nothing runs inside a timer: the caller collects fired timers from the
//! scheduler and hands them to [`Dashboard::on_timer_fired`].
//!
//! FETCHES
//! =======
//! A fetch is `start_fetch` (loading on, ticket issued), the provider's
//! future, then `finish_fetch`. Each ticket carries a generation drawn from a
//! dashboard-wide counter; only the latest ticket per widget may write. A
//! completion for a removed widget still goes through the store, which drops
//! it as an orphan.
//!
//! TIMERS
//! ======
//! Two kinds of timer exist per widget: the boundary's pending auto-retry and
//! the auto-refresh scheduled after each successful fetch when the widget has
//! a refresh interval. Both are tracked by the lifecycle manager so removal
//! cancels them.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::Level;

use crate::boundary::{BoundaryView, ErrorBoundary, FaultKind, RetryDecision, RetryPolicy};
use crate::clock::Clock;
use crate::config::DashboardConfig;
use crate::consts::{COMPONENT_BOUNDARY, COMPONENT_DASHBOARD, COMPONENT_KANBAN, COMPONENT_LIFECYCLE};
use crate::error::{DashboardError, ErrorCode};
use crate::kanban::{DragEnd, MoveOutcome, MoveRejection, RoadmapBoard};
use crate::lifecycle::{SequentialIds, WidgetLifecycle};
use crate::logging::SharedSink;
use crate::milestone::Milestone;
use crate::persistence::{DashboardSnapshot, PersistenceError, SnapshotStore};
use crate::provider::{DataProvider, FetchError};
use crate::registry::{WidgetRegistry, WidgetTemplate};
use crate::scheduler::{FiredTimer, Scheduler, TimerId};
use crate::skeleton::{WidgetView, render_view};
use crate::store::{DashboardState, WidgetAction, WidgetStore};
use crate::widget::{PartialWidgetConfig, WidgetData, WidgetId, WidgetRuntimeState, WidgetType};

// =============================================================================
// TYPES
// =============================================================================

/// Handle for one in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub widget_id: WidgetId,
    pub generation: u64,
}

/// What `finish_fetch` did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Data written to the store.
    Applied,
    /// Fetch failed or returned an invalid payload; the boundary decided.
    Failed(RetryDecision),
    /// A newer fetch for the same widget was started after this one.
    Stale,
    /// The widget was removed while the fetch was in flight.
    Orphaned,
}

/// What a fired timer turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Retried(FaultKind),
    Refreshed,
    Stale,
}

// =============================================================================
// DASHBOARD
// =============================================================================

pub struct Dashboard<S: Scheduler> {
    store: WidgetStore,
    lifecycle: WidgetLifecycle,
    boundaries: BTreeMap<WidgetId, ErrorBoundary>,
    policy: RetryPolicy,
    config: DashboardConfig,
    scheduler: S,
    clock: Arc<dyn Clock>,
    sink: SharedSink,
    providers: BTreeMap<WidgetType, Arc<dyn DataProvider>>,
    next_generation: u64,
    latest_fetch: BTreeMap<WidgetId, u64>,
    refresh_timers: BTreeMap<WidgetId, TimerId>,
}

impl<S: Scheduler> Dashboard<S> {
    /// A dashboard with the built-in widget types and sequential ids.
    #[must_use]
    pub fn new(config: DashboardConfig, scheduler: S, clock: Arc<dyn Clock>, sink: SharedSink) -> Self {
        Self {
            store: WidgetStore::new(sink.clone()),
            lifecycle: WidgetLifecycle::new(WidgetRegistry::builtin(), Box::new(SequentialIds::new())),
            boundaries: BTreeMap::new(),
            policy: RetryPolicy::from_config(&config),
            config,
            scheduler,
            clock,
            sink,
            providers: BTreeMap::new(),
            next_generation: 0,
            latest_fetch: BTreeMap::new(),
            refresh_timers: BTreeMap::new(),
        }
    }

    /// Replace the lifecycle manager (custom registry or id generator).
    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: WidgetLifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Route fetches for every widget of `widget_type` to `provider`.
    pub fn register_provider(&mut self, widget_type: WidgetType, provider: Arc<dyn DataProvider>) {
        self.providers.insert(widget_type, provider);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> &DashboardState {
        self.store.state()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    #[must_use]
    pub fn registry(&self) -> &WidgetRegistry {
        self.lifecycle.registry()
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn boundary(&self, id: &str) -> Option<&ErrorBoundary> {
        self.boundaries.get(id)
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    #[must_use]
    pub fn creatable_templates(&self) -> Vec<&WidgetTemplate> {
        self.lifecycle.creatable_templates(self.store.state())
    }

    fn require(&self, id: &str) -> Result<&Arc<WidgetRuntimeState>, DashboardError> {
        self.store.get(id).ok_or_else(|| DashboardError::UnknownWidget(id.to_string()))
    }

    fn log(&self, level: Level, component: &str, message: &str, payload: &Value) {
        self.sink.log(level, component, message, payload);
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Create and register a widget of `widget_type`. Returns its id.
    ///
    /// # Errors
    ///
    /// `Lifecycle` if the type is unknown or single-instance and taken.
    pub fn create_widget(&mut self, widget_type: &WidgetType) -> Result<WidgetId, DashboardError> {
        let config = match self.lifecycle.create_widget(self.store.state(), widget_type) {
            Ok(config) => config,
            Err(e) => {
                self.log(
                    Level::WARN,
                    COMPONENT_LIFECYCLE,
                    "widget creation rejected",
                    &json!({ "type": widget_type.as_str(), "code": e.error_code() }),
                );
                return Err(e.into());
            }
        };
        let id = config.id.clone();
        self.store.dispatch(WidgetAction::AddWidget { id: id.clone(), config });
        self.boundaries.insert(id.clone(), ErrorBoundary::new(id.clone()));
        self.log(
            Level::INFO,
            COMPONENT_LIFECYCLE,
            "widget created",
            &json!({ "id": id, "type": widget_type.as_str() }),
        );
        Ok(id)
    }

    /// Remove a widget, cancelling every timer it owns.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn remove_widget(&mut self, id: &str) -> Result<(), DashboardError> {
        self.require(id)?;
        let action = self.lifecycle.remove_widget(id, &mut self.scheduler);
        self.store.dispatch(action);
        self.boundaries.remove(id);
        self.refresh_timers.remove(id);
        self.latest_fetch.remove(id);
        self.log(Level::INFO, COMPONENT_LIFECYCLE, "widget removed", &json!({ "id": id }));
        Ok(())
    }

    /// Dispatch a raw action. Returns `true` if the state changed.
    pub fn dispatch(&mut self, action: WidgetAction) -> bool {
        self.store.dispatch(action)
    }

    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn update_config(&mut self, id: &str, partial: PartialWidgetConfig) -> Result<(), DashboardError> {
        self.require(id)?;
        self.store.dispatch(WidgetAction::UpdateWidgetConfig { id: id.to_string(), partial });
        Ok(())
    }

    pub fn reorder(&mut self, order: Vec<WidgetId>) {
        self.store.dispatch(WidgetAction::ReorderWidgets { order });
    }

    /// Validate `data` against the widget's type and write it.
    ///
    /// # Errors
    ///
    /// `UnknownWidget`, or `Validation` if the payload is rejected.
    pub fn set_data(&mut self, id: &str, data: WidgetData) -> Result<(), DashboardError> {
        let widget_type = self.require(id)?.config.widget_type.clone();
        self.lifecycle.registry().validate(&widget_type, &data)?;
        self.store.dispatch(WidgetAction::UpdateWidgetData { id: id.to_string(), data });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Mark `id` as loading and issue a ticket for the fetch.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn start_fetch(&mut self, id: &str) -> Result<FetchTicket, DashboardError> {
        self.require(id)?;
        self.next_generation += 1;
        let generation = self.next_generation;
        self.latest_fetch.insert(id.to_string(), generation);
        self.store.dispatch(WidgetAction::SetWidgetLoading { id: id.to_string(), loading: true });
        Ok(FetchTicket { widget_id: id.to_string(), generation })
    }

    /// Apply a fetch completion.
    pub fn finish_fetch(&mut self, ticket: &FetchTicket, result: Result<WidgetData, FetchError>) -> FetchOutcome {
        let id = ticket.widget_id.as_str();

        let Some(widget_type) = self.store.get(id).map(|w| w.config.widget_type.clone()) else {
            let action = match result {
                Ok(data) => WidgetAction::UpdateWidgetData { id: id.to_string(), data },
                Err(e) => WidgetAction::SetWidgetError { id: id.to_string(), error: Some(e.message) },
            };
            self.store.dispatch(action);
            return FetchOutcome::Orphaned;
        };

        if self.latest_fetch.get(id) != Some(&ticket.generation) {
            self.log(
                Level::DEBUG,
                COMPONENT_DASHBOARD,
                "dropped superseded fetch",
                &json!({ "id": id, "generation": ticket.generation }),
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(data) => match self.lifecycle.registry().validate(&widget_type, &data) {
                Ok(()) => {
                    self.store.dispatch(WidgetAction::UpdateWidgetData { id: id.to_string(), data });
                    if let Some(boundary) = self.boundaries.get_mut(id) {
                        boundary.on_success();
                    }
                    self.schedule_refresh(id);
                    FetchOutcome::Applied
                }
                Err(e) => FetchOutcome::Failed(self.fetch_failed(id, &e.to_string(), e.error_code())),
            },
            Err(e) => FetchOutcome::Failed(self.fetch_failed(id, &e.message, e.error_code())),
        }
    }

    /// Fetch `id` through its type's provider.
    ///
    /// # Errors
    ///
    /// `UnknownWidget`, or `NoProvider` if nothing serves the widget's type.
    /// A failing provider is not an error here; see [`FetchOutcome::Failed`].
    pub async fn refresh(&mut self, id: &str) -> Result<FetchOutcome, DashboardError> {
        let config = self.require(id)?.config.clone();
        let provider = self
            .providers
            .get(&config.widget_type)
            .cloned()
            .ok_or_else(|| DashboardError::NoProvider(config.widget_type.clone()))?;

        let ticket = self.start_fetch(id)?;
        let result = provider.fetch(&config).await;
        Ok(self.finish_fetch(&ticket, result))
    }

    async fn refetch(&mut self, id: &str) {
        if let Err(e) = self.refresh(id).await {
            self.log(
                Level::WARN,
                COMPONENT_DASHBOARD,
                "refetch skipped",
                &json!({ "id": id, "code": e.error_code(), "error": e.to_string() }),
            );
        }
    }

    fn fetch_failed(&mut self, id: &str, message: &str, code: &str) -> RetryDecision {
        self.store.dispatch(WidgetAction::SetWidgetError {
            id: id.to_string(),
            error: Some(message.to_string()),
        });
        let decision = self.fault(id, FaultKind::DataFetch, message);
        self.log(
            Level::WARN,
            COMPONENT_BOUNDARY,
            "widget fetch failed",
            &json!({ "id": id, "code": code, "error": message, "decision": describe(decision) }),
        );
        decision
    }

    fn schedule_refresh(&mut self, id: &str) {
        if let Some(old) = self.refresh_timers.remove(id) {
            self.scheduler.cancel(old);
            self.lifecycle.forget_timer(id, old);
        }
        let interval = self.store.get(id).map_or(0, |w| w.config.refresh_interval_ms);
        if interval == 0 {
            return;
        }
        let timer = self.scheduler.schedule(id, Duration::from_millis(interval));
        self.lifecycle.track_timer(id, timer);
        self.refresh_timers.insert(id.to_string(), timer);
    }

    // -------------------------------------------------------------------------
    // Faults and timers
    // -------------------------------------------------------------------------

    fn fault(&mut self, id: &str, kind: FaultKind, message: &str) -> RetryDecision {
        let boundary = self.boundaries.entry(id.to_string()).or_insert_with(|| ErrorBoundary::new(id));
        let decision = boundary.on_fault(kind, message, &self.policy, &mut self.scheduler);
        if let RetryDecision::Scheduled { timer, .. } = decision {
            self.lifecycle.track_timer(id, timer);
        }
        decision
    }

    /// Contain a render failure in `id`'s boundary.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn report_render_fault(&mut self, id: &str, message: &str) -> Result<RetryDecision, DashboardError> {
        self.require(id)?;
        let decision = self.fault(id, FaultKind::Render, message);
        self.log(
            Level::WARN,
            COMPONENT_BOUNDARY,
            "widget render failed",
            &json!({ "id": id, "error": message, "decision": describe(decision) }),
        );
        Ok(decision)
    }

    /// Act on a timer collected from the scheduler.
    pub async fn on_timer_fired(&mut self, fired: FiredTimer) -> TimerOutcome {
        let FiredTimer { id: timer, owner } = fired;
        self.lifecycle.forget_timer(&owner, timer);

        let retried = self
            .boundaries.get_mut(&owner).and_then(|b| b.on_retry_timer(timer).map(|kind| (kind, b.retry_count())));
        if let Some((kind, retry_count)) = retried {
            self.log(
                Level::INFO,
                COMPONENT_BOUNDARY,
                "automatic retry",
                &json!({ "id": owner, "retryCount": retry_count }),
            );
            if kind == FaultKind::DataFetch {
                self.refetch(&owner).await;
            }
            return TimerOutcome::Retried(kind);
        }

        if self.refresh_timers.get(&owner) == Some(&timer) {
            self.refresh_timers.remove(&owner);
            self.refetch(&owner).await;
            return TimerOutcome::Refreshed;
        }

        self.log(
            Level::DEBUG,
            COMPONENT_DASHBOARD,
            "ignored stale timer",
            &json!({ "id": owner, "timer": timer.raw() }),
        );
        TimerOutcome::Stale
    }

    /// User-initiated retry. Refetches when the cleared fault was a fetch
    /// failure or the widget still shows a store error (a dismissed fetch
    /// fault), and returns that fetch's outcome.
    ///
    /// # Errors
    ///
    /// `UnknownWidget`, or `NoProvider` when a refetch is needed but nothing
    /// serves the widget's type.
    pub async fn manual_retry(&mut self, id: &str) -> Result<Option<FetchOutcome>, DashboardError> {
        let has_error = self.require(id)?.error.is_some();
        let mut cleared = None;
        if let Some(boundary) = self.boundaries.get_mut(id) {
            let pending = boundary.pending_timer();
            cleared = boundary.manual_retry(&mut self.scheduler);
            if let Some(timer) = pending {
                self.lifecycle.forget_timer(id, timer);
            }
        }
        self.log(Level::INFO, COMPONENT_BOUNDARY, "manual retry", &json!({ "id": id }));

        if has_error || cleared == Some(FaultKind::DataFetch) {
            Ok(Some(self.refresh(id).await?))
        } else {
            Ok(None)
        }
    }

    /// Hide `id`'s fault card. Returns `false` if it was not faulted.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn dismiss(&mut self, id: &str) -> Result<bool, DashboardError> {
        self.require(id)?;
        let Some(boundary) = self.boundaries.get_mut(id) else {
            return Ok(false);
        };
        let pending = boundary.pending_timer();
        let dismissed = boundary.dismiss(&mut self.scheduler);
        if let Some(timer) = pending {
            self.lifecycle.forget_timer(id, timer);
        }
        Ok(dismissed)
    }

    // -------------------------------------------------------------------------
    // Roadmap board
    // -------------------------------------------------------------------------

    /// Current board of a roadmap widget. A board widget with no data yet
    /// has an empty default board.
    ///
    /// # Errors
    ///
    /// `UnknownWidget`, or `NotABoard` for other widget types.
    pub fn board(&self, widget_id: &str) -> Result<RoadmapBoard, DashboardError> {
        let widget = self.require(widget_id)?;
        if !widget.config.widget_type.is_roadmap_board() {
            return Err(DashboardError::NotABoard(widget_id.to_string()));
        }
        match &widget.data {
            Some(WidgetData::Roadmap(board)) => Ok(board.clone()),
            None => Ok(RoadmapBoard::default()),
            Some(WidgetData::Opaque(_)) => Err(DashboardError::NotABoard(widget_id.to_string())),
        }
    }

    /// Apply a drag gesture to a roadmap widget.
    ///
    /// # Errors
    ///
    /// `UnknownWidget`, `NotABoard`, or `Move` when the board refuses. A
    /// refused move leaves the store untouched.
    pub fn on_drag_end(&mut self, widget_id: &str, drag: &DragEnd) -> Result<MoveOutcome, DashboardError> {
        let board = self.board(widget_id)?;
        let result = board.move_milestone(drag, self.clock.now());
        self.commit_move(widget_id, &drag.milestone_id, result)
    }

    /// Move a milestone to the end of the next column.
    ///
    /// # Errors
    ///
    /// As [`Dashboard::on_drag_end`].
    pub fn advance_milestone(&mut self, widget_id: &str, milestone_id: &str) -> Result<MoveOutcome, DashboardError> {
        let board = self.board(widget_id)?;
        let result = board.advance_milestone(milestone_id, self.clock.now());
        self.commit_move(widget_id, milestone_id, result)
    }

    fn commit_move(
        &mut self,
        widget_id: &str,
        milestone_id: &str,
        result: Result<MoveOutcome, MoveRejection>,
    ) -> Result<MoveOutcome, DashboardError> {
        match result {
            Ok(outcome) => {
                self.store.dispatch(WidgetAction::UpdateWidgetData {
                    id: widget_id.to_string(),
                    data: WidgetData::Roadmap(outcome.board.clone()),
                });
                self.log(
                    Level::INFO,
                    COMPONENT_KANBAN,
                    "milestone moved",
                    &json!({
                        "id": widget_id,
                        "milestone": milestone_id,
                        "status": outcome.milestone.status.as_str(),
                        "progress": outcome.milestone.progress,
                    }),
                );
                Ok(outcome)
            }
            Err(rejection) => {
                self.log(
                    Level::WARN,
                    COMPONENT_KANBAN,
                    "move rejected",
                    &json!({
                        "id": widget_id,
                        "milestone": milestone_id,
                        "code": rejection.error_code(),
                        "reason": rejection.to_string(),
                    }),
                );
                Err(rejection.into())
            }
        }
    }

    /// Add a milestone to `column_id` of a roadmap widget.
    ///
    /// # Errors
    ///
    /// `UnknownWidget`, `NotABoard`, or `Move` for an unknown or full column.
    pub fn create_milestone(
        &mut self,
        widget_id: &str,
        column_id: &str,
        title: &str,
    ) -> Result<Milestone, DashboardError> {
        let board = self.board(widget_id)?;
        match board.create_milestone(column_id, title, self.config.default_estimated_hours, self.clock.now()) {
            Ok((board, milestone)) => {
                self.store.dispatch(WidgetAction::UpdateWidgetData {
                    id: widget_id.to_string(),
                    data: WidgetData::Roadmap(board),
                });
                self.log(
                    Level::INFO,
                    COMPONENT_KANBAN,
                    "milestone created",
                    &json!({ "id": widget_id, "milestone": milestone.id, "column": column_id }),
                );
                Ok(milestone)
            }
            Err(rejection) => {
                self.log(
                    Level::WARN,
                    COMPONENT_KANBAN,
                    "milestone creation rejected",
                    &json!({ "id": widget_id, "column": column_id, "code": rejection.error_code() }),
                );
                Err(rejection.into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn boundary_view(&self, id: &str) -> BoundaryView {
        self.boundaries.get(id).map_or(BoundaryView::Stable, |b| b.view(&self.policy))
    }

    #[must_use]
    pub fn view(&self, id: &str) -> Option<WidgetView> {
        let widget = self.store.get(id)?;
        Some(render_view(widget, &self.boundary_view(id), self.lifecycle.registry()))
    }

    /// Every widget's view, in display order.
    #[must_use]
    pub fn views(&self) -> Vec<(WidgetId, WidgetView)> {
        self.store
            .ordered_widgets()
            .into_iter()
            .map(|w| {
                let id = w.config.id.clone();
                let view = render_view(w, &self.boundary_view(&id), self.lifecycle.registry());
                (id, view)
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::capture(self.store.state())
    }

    /// Replace the whole dashboard with `snapshot`. Pending timers are
    /// cancelled and fault state is reset.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` or `NotABoard` for a board without a matching roadmap
    /// widget, `Validation` for an invalid board. Nothing changes on error.
    pub fn restore(&mut self, snapshot: DashboardSnapshot) -> Result<(), DashboardError> {
        for (id, board) in &snapshot.boards {
            let Some(config) = snapshot.widgets.iter().find(|w| w.id == *id) else {
                return Err(DashboardError::UnknownWidget(id.clone()));
            };
            if !config.widget_type.is_roadmap_board() {
                return Err(DashboardError::NotABoard(id.clone()));
            }
            board.validate()?;
        }

        self.lifecycle.cancel_all(&mut self.scheduler);
        self.refresh_timers.clear();
        self.latest_fetch.clear();
        self.boundaries.clear();
        self.store = WidgetStore::new(self.sink.clone());

        let count = snapshot.widgets.len();
        for config in snapshot.widgets {
            let id = config.id.clone();
            if self.store.dispatch(WidgetAction::AddWidget { id: id.clone(), config }) {
                self.boundaries.insert(id.clone(), ErrorBoundary::new(id));
            }
        }
        self.store.dispatch(WidgetAction::ReorderWidgets { order: snapshot.order });
        for (id, board) in snapshot.boards {
            self.store.dispatch(WidgetAction::UpdateWidgetData { id, data: WidgetData::Roadmap(board) });
        }

        self.log(Level::INFO, COMPONENT_DASHBOARD, "dashboard restored", &json!({ "widgets": count }));
        Ok(())
    }

    /// # Errors
    ///
    /// Whatever the store reports.
    pub async fn save_to(&self, store: &dyn SnapshotStore, key: &str) -> Result<(), PersistenceError> {
        store.save(key, &self.snapshot()).await
    }

    /// Restore from `store`. Returns `false` if nothing is saved under `key`.
    ///
    /// # Errors
    ///
    /// `Persistence` on load failure, otherwise as [`Dashboard::restore`].
    pub async fn load_from(&mut self, store: &dyn SnapshotStore, key: &str) -> Result<bool, DashboardError> {
        match store.load(key).await? {
            Some(snapshot) => {
                self.restore(snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn describe(decision: RetryDecision) -> Value {
    match decision {
        RetryDecision::Scheduled { delay, .. } => {
            json!({ "retry": "scheduled", "delayMs": u64::try_from(delay.as_millis()).unwrap_or(u64::MAX) })
        }
        RetryDecision::AlreadyPending => json!({ "retry": "pending" }),
        RetryDecision::Manual => json!({ "retry": "manual" }),
        RetryDecision::Exhausted => json!({ "retry": "exhausted" }),
    }
}
