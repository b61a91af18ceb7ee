use std::time::Duration;

use super::*;
use crate::scheduler::VirtualScheduler;
use crate::store::reduce;
use crate::widget::{DOCUMENT_REVIEWER, MARKET_INSIGHTS, ROADMAP_BOARD, SKILL_RADAR};

fn lifecycle() -> WidgetLifecycle {
    WidgetLifecycle::new(WidgetRegistry::builtin(), Box::new(SequentialIds::new()))
}

fn add(state: &DashboardState, config: WidgetConfig) -> DashboardState {
    reduce(state, &WidgetAction::AddWidget { id: config.id.clone(), config }).state
}

/// Hands out a fixed list of ids, for collision tests.
struct ScriptedIds(Vec<&'static str>);

impl IdGenerator for ScriptedIds {
    fn next_id(&mut self, _widget_type: &WidgetType) -> WidgetId {
        self.0.remove(0).to_string()
    }
}

// =============================================================
// create_widget
// =============================================================

#[test]
fn first_widget_gets_sequence_one_at_origin() {
    let mut lc = lifecycle();
    let config = lc.create_widget(&DashboardState::new(), &WidgetType::roadmap_board()).unwrap();
    assert_eq!(config.id, "roadmap-board-1");
    assert_eq!(config.position, Position { x: 0, y: 0, width: 12, height: 6 });
    assert_eq!(config.title, "Learning Roadmap");
    assert!(config.is_visible);
    assert!(!config.is_minimized);
    assert!(config.custom_settings.is_empty());
}

#[test]
fn counter_is_shared_across_types() {
    let mut lc = lifecycle();
    let mut state = DashboardState::new();
    let a = lc.create_widget(&state, &WidgetType::new(SKILL_RADAR)).unwrap();
    state = add(&state, a.clone());
    let b = lc.create_widget(&state, &WidgetType::new(MARKET_INSIGHTS)).unwrap();
    assert_eq!(a.id, "skill-radar-1");
    assert_eq!(b.id, "market-insights-2");
}

#[test]
fn new_widget_goes_below_lowest() {
    let mut lc = lifecycle();
    let mut state = DashboardState::new();
    let roadmap = lc.create_widget(&state, &WidgetType::roadmap_board()).unwrap();
    state = add(&state, roadmap);
    let radar = lc.create_widget(&state, &WidgetType::new(SKILL_RADAR)).unwrap();
    assert_eq!(radar.position.y, 6);
    assert_eq!(radar.position.x, 0);
    state = add(&state, radar);
    let doc = lc.create_widget(&state, &WidgetType::new(DOCUMENT_REVIEWER)).unwrap();
    assert_eq!(doc.position.y, 10);
}

#[test]
fn single_instance_type_rejected_twice() {
    let mut lc = lifecycle();
    let first = lc.create_widget(&DashboardState::new(), &WidgetType::roadmap_board()).unwrap();
    let state = add(&DashboardState::new(), first);

    let err = lc.create_widget(&state, &WidgetType::roadmap_board()).unwrap_err();
    assert_eq!(err, LifecycleError::SingleInstanceExists(WidgetType::roadmap_board()));
    assert_eq!(err.error_code(), "E_SINGLE_INSTANCE");
}

#[test]
fn failed_creation_does_not_advance_counter() {
    let mut lc = lifecycle();
    let first = lc.create_widget(&DashboardState::new(), &WidgetType::roadmap_board()).unwrap();
    let state = add(&DashboardState::new(), first);

    assert!(lc.create_widget(&state, &WidgetType::roadmap_board()).is_err());
    assert!(lc.create_widget(&state, &WidgetType::new("nope")).is_err());
    let next = lc.create_widget(&state, &WidgetType::new(MARKET_INSIGHTS)).unwrap();
    assert_eq!(next.id, "market-insights-2");
}

#[test]
fn multi_instance_type_allows_many() {
    let mut lc = lifecycle();
    let mut state = DashboardState::new();
    for expected in ["document-reviewer-1", "document-reviewer-2", "document-reviewer-3"] {
        let config = lc.create_widget(&state, &WidgetType::new(DOCUMENT_REVIEWER)).unwrap();
        assert_eq!(config.id, expected);
        state = add(&state, config);
    }
    assert_eq!(state.len(), 3);
}

#[test]
fn oversized_template_is_clamped_to_grid() {
    let mut registry = WidgetRegistry::builtin();
    let mut wide = registry.get(&WidgetType::new(MARKET_INSIGHTS)).unwrap().clone();
    wide.template.default_size = crate::registry::Size { width: 40, height: 0 };
    registry.register(wide);
    let mut lc = WidgetLifecycle::new(registry, Box::new(SequentialIds::new()));

    let config = lc.create_widget(&DashboardState::new(), &WidgetType::new(MARKET_INSIGHTS)).unwrap();
    assert_eq!(config.position.width, GRID_COLUMNS);
    assert_eq!(config.position.height, 1);
}

#[test]
fn unknown_type_rejected() {
    let mut lc = lifecycle();
    let err = lc.create_widget(&DashboardState::new(), &WidgetType::new("weather")).unwrap_err();
    assert_eq!(err.error_code(), "E_UNKNOWN_WIDGET_TYPE");
}

#[test]
fn generated_ids_skip_existing_widgets() {
    let mut lc = WidgetLifecycle::new(
        WidgetRegistry::builtin(),
        Box::new(ScriptedIds(vec!["taken", "fresh"])),
    );
    let mut taken = crate::test_helpers::widget_config("taken", DOCUMENT_REVIEWER);
    taken.position.height = 1;
    let state = add(&DashboardState::new(), taken);
    let config = lc.create_widget(&state, &WidgetType::new(DOCUMENT_REVIEWER)).unwrap();
    assert_eq!(config.id, "fresh");
}

// =============================================================
// creatable_templates
// =============================================================

#[test]
fn creatable_templates_hide_used_singletons() {
    let mut lc = lifecycle();
    assert_eq!(lc.creatable_templates(&DashboardState::new()).len(), 6);

    let roadmap = lc.create_widget(&DashboardState::new(), &WidgetType::roadmap_board()).unwrap();
    let state = add(&DashboardState::new(), roadmap);
    let tags: Vec<&str> = lc.creatable_templates(&state).iter().map(|t| t.widget_type.as_str()).collect();
    assert_eq!(tags.len(), 5);
    assert!(!tags.contains(&ROADMAP_BOARD));
}

#[test]
fn creatable_templates_keep_used_multiples() {
    let mut lc = lifecycle();
    let doc = lc.create_widget(&DashboardState::new(), &WidgetType::new(DOCUMENT_REVIEWER)).unwrap();
    let state = add(&DashboardState::new(), doc);
    assert_eq!(lc.creatable_templates(&state).len(), 6);
}

// =============================================================
// Timers / removal
// =============================================================

#[test]
fn remove_cancels_owned_timers_only() {
    let mut lc = lifecycle();
    let mut sched = VirtualScheduler::new();
    let a1 = sched.schedule("a", Duration::from_secs(1));
    let a2 = sched.schedule("a", Duration::from_secs(5));
    let b1 = sched.schedule("b", Duration::from_secs(1));
    lc.track_timer("a", a1);
    lc.track_timer("a", a2);
    lc.track_timer("b", b1);

    let action = lc.remove_widget("a", &mut sched);
    assert_eq!(action, WidgetAction::RemoveWidget { id: "a".into() });
    assert!(sched.pending_for("a").is_empty());
    assert_eq!(sched.pending_for("b").len(), 1);
    assert!(lc.timers_for("a").is_empty());
    assert_eq!(lc.timers_for("b"), vec![b1]);
}

#[test]
fn forget_timer_drops_empty_owner() {
    let mut lc = lifecycle();
    let mut sched = VirtualScheduler::new();
    let t = sched.schedule("a", Duration::from_secs(1));
    lc.track_timer("a", t);
    lc.forget_timer("a", t);
    assert!(lc.timers_for("a").is_empty());
    lc.forget_timer("ghost", t);
}

#[test]
fn cancel_all_clears_every_owner() {
    let mut lc = lifecycle();
    let mut sched = VirtualScheduler::new();
    for owner in ["a", "b", "c"] {
        let t = sched.schedule(owner, Duration::from_secs(2));
        lc.track_timer(owner, t);
    }
    lc.cancel_all(&mut sched);
    assert!(sched.pending().is_empty());
    assert!(lc.timers_for("b").is_empty());
}
