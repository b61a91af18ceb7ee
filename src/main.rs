use std::sync::Arc;

use serde_json::json;
use tracing::info;

use dashboard::clock::SystemClock;
use dashboard::config::DashboardConfig;
use dashboard::dashboard::Dashboard;
use dashboard::error::{DashboardError, ErrorCode};
use dashboard::kanban::{DragEnd, RoadmapBoard};
use dashboard::logging::{TracingSink, init_tracing};
use dashboard::milestone::MilestoneStatus::{Backlog, InProgress, Review};
use dashboard::milestone::{Milestone, MilestoneStatus, Priority};
use dashboard::provider::{FlakyProvider, StaticProvider};
use dashboard::scheduler::TokioScheduler;
use dashboard::widget::{MARKET_INSIGHTS, WidgetData, WidgetType};

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    init_tracing();

    let config = DashboardConfig::from_env();
    info!(
        max_retries = config.max_retries,
        retry_base_ms = u64::try_from(config.retry_base.as_millis()).unwrap_or(u64::MAX),
        "dashboard starting"
    );
    let mut dash = Dashboard::new(config, TokioScheduler::new(), Arc::new(SystemClock), Arc::new(TracingSink));

    dash.register_provider(
        WidgetType::roadmap_board(),
        Arc::new(StaticProvider::new(WidgetData::Roadmap(seed_board()))),
    );
    dash.register_provider(
        WidgetType::new(MARKET_INSIGHTS),
        Arc::new(FlakyProvider::new(
            2,
            "market feed network timeout",
            WidgetData::Opaque(json!({ "role": "backend engineer", "openings": 1840, "trend": "up" })),
        )),
    );

    let roadmap = dash.create_widget(&WidgetType::roadmap_board())?;
    let market = dash.create_widget(&WidgetType::new(MARKET_INSIGHTS))?;

    let outcome = dash.refresh(&roadmap).await?;
    info!(id = %roadmap, ?outcome, "roadmap loaded");

    // Board moves: start a milestone, finish one, then hit the WIP limit.
    dash.on_drag_end(&roadmap, &DragEnd::new("ownership", Backlog, InProgress, 0))?;
    dash.advance_milestone(&roadmap, "traits")?;
    match dash.on_drag_end(&roadmap, &DragEnd::new("async", Backlog, InProgress, 1)) {
        Ok(_) => info!("async moved to in-progress"),
        Err(e) => info!(code = e.error_code(), error = %e, "move refused"),
    }
    let created = dash.create_milestone(&roadmap, Backlog.as_str(), "Write a tokio service")?;
    info!(milestone = %created.id, "milestone created");

    for stats in dash.board(&roadmap)?.column_stats() {
        info!(
            column = %stats.column,
            count = stats.count,
            hours = stats.total_estimated_hours,
            progress = stats.average_progress,
            "column"
        );
    }

    // Flaky feed: fails twice, recovers on the second automatic retry.
    let outcome = dash.refresh(&market).await?;
    info!(id = %market, ?outcome, "market insights first fetch");
    while dash.boundary(&market).is_some_and(|b| b.pending_timer().is_some()) {
        let Some(fired) = dash.scheduler_mut().next_fired().await else {
            break;
        };
        let outcome = dash.on_timer_fired(fired).await;
        info!(id = %market, ?outcome, "timer handled");
    }

    for (id, view) in dash.views() {
        info!(%id, ?view, "widget view");
    }

    println!("{}", dash.snapshot().to_json()?);
    Ok(())
}

fn seed_board() -> RoadmapBoard {
    let entries = [
        ("ownership", "Ownership and borrowing", Backlog, 0, 8.0, Priority::High, &["rust"][..]),
        ("async", "Async Rust with tokio", Backlog, 0, 16.0, Priority::Medium, &["rust", "tokio"][..]),
        ("lifetimes", "Lifetimes in practice", InProgress, 40, 6.0, Priority::High, &["rust"][..]),
        ("errors", "Error handling with thiserror", InProgress, 60, 4.0, Priority::Medium, &["rust"][..]),
        ("traits", "Trait objects and generics", Review, 90, 10.0, Priority::Low, &["rust"][..]),
    ];

    let milestones = entries
        .into_iter()
        .map(|(id, title, status, progress, hours, priority, skills)| {
            let mut m = Milestone::new(id, title, status);
            m.progress = progress;
            m.estimated_hours = hours;
            m.priority = priority;
            m.difficulty = difficulty_for(status);
            m.skills = skills.iter().map(ToString::to_string).collect();
            m.category = "language".into();
            m
        })
        .collect();

    RoadmapBoard { milestones, ..RoadmapBoard::default() }
}

fn difficulty_for(status: MilestoneStatus) -> u8 {
    match status {
        Backlog => 3,
        InProgress => 4,
        _ => 2,
    }
}
