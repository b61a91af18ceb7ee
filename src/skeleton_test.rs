use serde_json::json;

use super::*;
use crate::boundary::{ErrorBoundary, FaultKind, RetryPolicy};
use crate::scheduler::VirtualScheduler;
use crate::test_helpers::widget_config;
use crate::widget::{ROADMAP_BOARD, SKILL_RADAR};

fn state(widget_type: &str) -> WidgetRuntimeState {
    WidgetRuntimeState::new(widget_config("w-1", widget_type))
}

fn faulted() -> BoundaryView {
    let mut b = ErrorBoundary::new("w-1");
    b.on_fault(FaultKind::Render, "chart exploded", &RetryPolicy::default(), &mut VirtualScheduler::new());
    b.view(&RetryPolicy::default())
}

#[test]
fn no_data_shows_type_skeleton() {
    let registry = WidgetRegistry::builtin();
    assert_eq!(
        render_view(&state(ROADMAP_BOARD), &BoundaryView::Stable, &registry),
        WidgetView::Skeleton(SkeletonShape::Board { columns: 4, cards: 3 })
    );
    assert_eq!(
        render_view(&state(SKILL_RADAR), &BoundaryView::Stable, &registry),
        WidgetView::Skeleton(SkeletonShape::Chart)
    );
    assert_eq!(
        render_view(&state("unregistered"), &BoundaryView::Stable, &registry),
        WidgetView::Skeleton(SkeletonShape::Card)
    );
}

#[test]
fn loading_over_existing_data_shows_skeleton() {
    let mut s = state(SKILL_RADAR);
    s.data = Some(WidgetData::Opaque(json!([1])));
    s.is_loading = true;
    assert_eq!(
        render_view(&s, &BoundaryView::Stable, &WidgetRegistry::builtin()),
        WidgetView::Skeleton(SkeletonShape::Chart)
    );
}

#[test]
fn data_shows_content() {
    let mut s = state(SKILL_RADAR);
    s.data = Some(WidgetData::Opaque(json!({"rust": 4})));
    assert_eq!(
        render_view(&s, &BoundaryView::Stable, &WidgetRegistry::builtin()),
        WidgetView::Content(WidgetData::Opaque(json!({"rust": 4})))
    );
}

#[test]
fn store_error_shows_inline_error() {
    let mut s = state(SKILL_RADAR);
    s.error = Some("Network down".into());
    assert_eq!(
        render_view(&s, &BoundaryView::Stable, &WidgetRegistry::builtin()),
        WidgetView::Error { message: "Network down".into() }
    );
}

#[test]
fn hidden_beats_everything() {
    let mut s = state(SKILL_RADAR);
    s.config.is_visible = false;
    s.config.is_minimized = true;
    s.is_loading = true;
    assert_eq!(render_view(&s, &faulted(), &WidgetRegistry::builtin()), WidgetView::Hidden);
}

#[test]
fn fault_beats_minimized_and_loading() {
    let mut s = state(SKILL_RADAR);
    s.config.is_minimized = true;
    s.is_loading = true;
    let view = render_view(&s, &faulted(), &WidgetRegistry::builtin());
    let WidgetView::Faulted(card) = view else {
        panic!("expected fault card, got {view:?}");
    };
    assert_eq!(card.message, "chart exploded");
}

#[test]
fn minimized_beats_loading() {
    let mut s = state(SKILL_RADAR);
    s.config.is_minimized = true;
    s.is_loading = true;
    assert_eq!(
        render_view(&s, &BoundaryView::Stable, &WidgetRegistry::builtin()),
        WidgetView::Minimized { title: "skill-radar widget".into() }
    );
}

#[test]
fn view_json_is_tagged() {
    let value = serde_json::to_value(WidgetView::Skeleton(SkeletonShape::List { rows: 5 })).unwrap();
    assert_eq!(value, json!({"view": "skeleton", "detail": {"shape": "list", "rows": 5}}));
}
