#![allow(clippy::float_cmp)]

use super::*;
use crate::test_helpers::{NOW, board, board_with_full_review, milestone};

use crate::milestone::MilestoneStatus::{Backlog, Completed, InProgress, Review};

fn ids(board: &RoadmapBoard, status: MilestoneStatus) -> Vec<String> {
    board.milestones_in(status).iter().map(|m| m.id.clone()).collect()
}

// =============================================================
// Columns and queries
// =============================================================

#[test]
fn default_columns_cover_every_status() {
    let columns = Column::defaults();
    let statuses: Vec<MilestoneStatus> = columns.iter().map(|c| c.id).collect();
    assert_eq!(statuses, MilestoneStatus::ALL.to_vec());
    assert_eq!(columns[1].limit, Some(3));
    assert_eq!(columns[2].limit, Some(5));
    assert_eq!(columns[0].limit, None);
}

#[test]
fn milestones_in_filters_by_status_in_list_order() {
    let b = board(vec![
        milestone("a", Backlog),
        milestone("b", Review),
        milestone("c", Backlog),
    ]);
    assert_eq!(ids(&b, Backlog), vec!["a", "c"]);
    assert_eq!(ids(&b, Review), vec!["b"]);
    assert!(ids(&b, Completed).is_empty());
}

#[test]
fn column_json_omits_missing_limit() {
    let value = serde_json::to_value(&Column::defaults()[0]).unwrap();
    assert!(value.get("limit").is_none());
    assert_eq!(value["id"], "backlog");
}

// =============================================================
// Stats
// =============================================================

#[test]
fn column_stats_sum_hours_and_average_progress() {
    let mut a = milestone("a", InProgress);
    a.progress = 25;
    a.estimated_hours = 4.0;
    let mut b = milestone("b", InProgress);
    b.progress = 75;
    b.estimated_hours = 6.5;
    let board = board(vec![a, b]);

    let stats = board.column_stats();
    assert_eq!(stats.len(), 4);
    let in_progress = &stats[1];
    assert_eq!(in_progress.column, InProgress);
    assert_eq!(in_progress.count, 2);
    assert_eq!(in_progress.total_estimated_hours, 10.5);
    assert_eq!(in_progress.average_progress, 50.0);
}

#[test]
fn column_stats_empty_column_is_zero() {
    let stats = board(Vec::new()).column_stats();
    for s in stats {
        assert_eq!(s.count, 0);
        assert_eq!(s.total_estimated_hours, 0.0);
        assert_eq!(s.average_progress, 0.0);
    }
}

// =============================================================
// Validation
// =============================================================

#[test]
fn validate_accepts_well_formed_board() {
    let b = board(vec![milestone("a", Backlog), milestone("b", Completed)]);
    assert!(b.validate().is_ok());
}

#[test]
fn validate_rejects_duplicate_milestone_ids() {
    let b = board(vec![milestone("a", Backlog), milestone("a", Review)]);
    assert_eq!(b.validate(), Err(ValidationError::DuplicateMilestone("a".into())));
}

#[test]
fn validate_rejects_duplicate_columns() {
    let mut b = board(Vec::new());
    b.columns.push(b.columns[0].clone());
    assert_eq!(b.validate(), Err(ValidationError::DuplicateColumn(Backlog)));
}

#[test]
fn validate_rejects_milestone_without_column() {
    let mut b = board(vec![milestone("a", Review)]);
    b.columns.retain(|c| c.id != Review);
    assert!(matches!(b.validate(), Err(ValidationError::MissingColumn { status: Review, .. })));
}

#[test]
fn validate_propagates_milestone_errors() {
    let mut m = milestone("a", Backlog);
    m.difficulty = 9;
    assert!(matches!(board(vec![m]).validate(), Err(ValidationError::Difficulty { .. })));
}

// =============================================================
// move_milestone: accepted
// =============================================================

#[test]
fn move_backlog_to_in_progress_sets_started_progress() {
    let b = board(vec![milestone("m1", Backlog)]);
    let outcome = b.move_milestone(&DragEnd::new("m1", Backlog, InProgress, 0), NOW).unwrap();

    assert_eq!(outcome.milestone.status, InProgress);
    assert_eq!(outcome.milestone.progress, 25);
    assert_eq!(ids(&outcome.board, InProgress), vec!["m1"]);
    assert!(ids(&outcome.board, Backlog).is_empty());
    assert_eq!(outcome.stats[1].count, 1);
    assert_eq!(outcome.stats[1].average_progress, 25.0);
}

#[test]
fn move_to_completed_sets_full_progress_and_date() {
    let mut m = milestone("m1", InProgress);
    m.progress = 25;
    let b = board(vec![m]);
    let outcome = b.move_milestone(&DragEnd::new("m1", InProgress, Completed, 0), NOW).unwrap();
    assert_eq!(outcome.milestone.progress, 100);
    assert_eq!(outcome.milestone.completed_date, Some(NOW));
    assert!(outcome.board.validate().is_ok());
}

#[test]
fn move_backward_out_of_completed_is_allowed() {
    let b = board(vec![milestone("m1", Completed)]);
    let outcome = b.move_milestone(&DragEnd::new("m1", Completed, Backlog, 0), NOW).unwrap();
    assert_eq!(outcome.milestone.status, Backlog);
    assert_eq!(outcome.milestone.completed_date, None);
}

#[test]
fn move_inserts_at_destination_index() {
    let b = board(vec![
        milestone("r1", Review),
        milestone("x", InProgress),
        milestone("r2", Review),
    ]);
    let outcome = b.move_milestone(&DragEnd::new("x", InProgress, Review, 1), NOW).unwrap();
    assert_eq!(ids(&outcome.board, Review), vec!["r1", "x", "r2"]);
}

#[test]
fn move_index_past_end_appends() {
    let b = board(vec![milestone("r1", Review), milestone("x", Backlog)]);
    let outcome = b.move_milestone(&DragEnd::new("x", Backlog, Review, 99), NOW).unwrap();
    assert_eq!(ids(&outcome.board, Review), vec!["r1", "x"]);
}

#[test]
fn move_into_empty_column() {
    let b = board(vec![milestone("a", Backlog), milestone("b", Backlog)]);
    let outcome = b.move_milestone(&DragEnd::new("b", Backlog, Review, 0), NOW).unwrap();
    assert_eq!(ids(&outcome.board, Review), vec!["b"]);
    assert_eq!(ids(&outcome.board, Backlog), vec!["a"]);
}

#[test]
fn reorder_within_column() {
    let b = board(vec![
        milestone("a", Backlog),
        milestone("b", Backlog),
        milestone("c", Backlog),
    ]);
    let outcome = b.move_milestone(&DragEnd::new("a", Backlog, Backlog, 2), NOW).unwrap();
    assert_eq!(ids(&outcome.board, Backlog), vec!["b", "c", "a"]);
    assert_eq!(outcome.milestone.progress, 0);

    let outcome = b.move_milestone(&DragEnd::new("c", Backlog, Backlog, 0), NOW).unwrap();
    assert_eq!(ids(&outcome.board, Backlog), vec!["c", "a", "b"]);
}

#[test]
fn reorder_within_full_column_ignores_limit() {
    let b = board_with_full_review(5);
    let outcome = b.move_milestone(&DragEnd::new("r0", Review, Review, 4), NOW).unwrap();
    assert_eq!(ids(&outcome.board, Review), vec!["r1", "r2", "r3", "r4", "r0"]);
}

#[test]
fn move_leaves_original_board_untouched() {
    let b = board(vec![milestone("m1", Backlog)]);
    let before = b.clone();
    let _outcome = b.move_milestone(&DragEnd::new("m1", Backlog, Review, 0), NOW).unwrap();
    assert_eq!(b, before);
}

// =============================================================
// move_milestone: rejected
// =============================================================

#[test]
fn wip_limit_rejects_cross_column_move() {
    let b = board_with_full_review(5);
    let err = b.move_milestone(&DragEnd::new("mover", InProgress, Review, 0), NOW).unwrap_err();
    assert_eq!(err, MoveRejection::WipLimitExceeded { column: Review, limit: 5 });
    assert_eq!(err.error_code(), "E_WIP_LIMIT");
    assert_eq!(b.milestones_in(Review).len(), 5);
    assert_eq!(b.milestone("mover").map(|m| m.status), Some(InProgress));
}

#[test]
fn wip_limit_of_zero_blocks_everything() {
    let mut b = board(vec![milestone("a", Backlog)]);
    b.columns[2].limit = Some(0);
    let err = b.move_milestone(&DragEnd::new("a", Backlog, Review, 0), NOW).unwrap_err();
    assert_eq!(err, MoveRejection::WipLimitExceeded { column: Review, limit: 0 });
}

#[test]
fn column_below_limit_accepts() {
    let mut b = board_with_full_review(5);
    b.milestones.retain(|m| m.id != "r4");
    let outcome = b.move_milestone(&DragEnd::new("mover", InProgress, Review, 0), NOW).unwrap();
    assert_eq!(outcome.board.milestones_in(Review).len(), 5);
}

#[test]
fn same_slot_is_rejected() {
    let b = board(vec![milestone("a", Backlog), milestone("b", Backlog)]);
    let err = b.move_milestone(&DragEnd::new("b", Backlog, Backlog, 1), NOW).unwrap_err();
    assert_eq!(err, MoveRejection::UnchangedPosition("b".into()));

    let err = b.move_milestone(&DragEnd::new("b", Backlog, Backlog, 7), NOW).unwrap_err();
    assert_eq!(err, MoveRejection::UnchangedPosition("b".into()));
}

#[test]
fn unknown_columns_are_rejected() {
    let b = board(vec![milestone("a", Backlog)]);
    let drag = DragEnd {
        milestone_id: "a".into(),
        source: "backlog".into(),
        destination: "archive".into(),
        dest_index: 0,
    };
    assert_eq!(b.move_milestone(&drag, NOW), Err(MoveRejection::UnknownColumn("archive".into())));

    let drag = DragEnd {
        milestone_id: "a".into(),
        source: "nowhere".into(),
        destination: "review".into(),
        dest_index: 0,
    };
    assert_eq!(b.move_milestone(&drag, NOW), Err(MoveRejection::UnknownColumn("nowhere".into())));
}

#[test]
fn column_missing_from_board_is_unknown() {
    let mut b = board(vec![milestone("a", Backlog)]);
    b.columns.retain(|c| c.id != Review);
    let err = b.move_milestone(&DragEnd::new("a", Backlog, Review, 0), NOW).unwrap_err();
    assert_eq!(err, MoveRejection::UnknownColumn("review".into()));
}

#[test]
fn unknown_milestone_is_rejected() {
    let b = board(Vec::new());
    let err = b.move_milestone(&DragEnd::new("ghost", Backlog, Review, 0), NOW).unwrap_err();
    assert_eq!(err, MoveRejection::UnknownMilestone("ghost".into()));
}

#[test]
fn stale_source_column_is_rejected() {
    let b = board(vec![milestone("a", Review)]);
    let err = b.move_milestone(&DragEnd::new("a", Backlog, Completed, 0), NOW).unwrap_err();
    assert_eq!(err, MoveRejection::SourceMismatch { id: "a".into(), claimed: Backlog, actual: Review });
}

// =============================================================
// advance_milestone
// =============================================================

#[test]
fn advance_moves_to_end_of_next_column() {
    let b = board(vec![milestone("r1", InProgress), milestone("a", Backlog)]);
    let outcome = b.advance_milestone("a", NOW).unwrap();
    assert_eq!(ids(&outcome.board, InProgress), vec!["r1", "a"]);
    assert_eq!(outcome.milestone.progress, 25);
}

#[test]
fn advance_completed_is_unchanged() {
    let b = board(vec![milestone("a", Completed)]);
    assert_eq!(b.advance_milestone("a", NOW), Err(MoveRejection::UnchangedPosition("a".into())));
    assert_eq!(b.advance_milestone("zz", NOW), Err(MoveRejection::UnknownMilestone("zz".into())));
}

// =============================================================
// create_milestone
// =============================================================

#[test]
fn create_milestone_uses_defaults() {
    let b = board(Vec::new());
    let (next, created) = b.create_milestone("backlog", "Learn tokio", 10.0, NOW).unwrap();

    assert_eq!(created.status, Backlog);
    assert_eq!(created.progress, 0);
    assert_eq!(created.estimated_hours, 10.0);
    assert!(created.skills.is_empty());
    assert!(created.prerequisites.is_empty());
    assert!(created.resources.is_empty());
    assert!(created.tags.is_empty());
    assert_eq!(created.completed_date, None);
    assert!(Uuid::parse_str(&created.id).is_ok());
    assert_eq!(next.milestones, vec![created]);
    assert!(next.validate().is_ok());
}

#[test]
fn create_milestone_in_progress_keeps_zero_progress() {
    let (_, created) = board(Vec::new()).create_milestone("in-progress", "x", 10.0, NOW).unwrap();
    assert_eq!(created.progress, 0);
}

#[test]
fn create_milestone_in_completed_is_stamped() {
    let (next, created) = board(Vec::new()).create_milestone("completed", "x", 10.0, NOW).unwrap();
    assert_eq!(created.progress, 100);
    assert_eq!(created.completed_date, Some(NOW));
    assert!(next.validate().is_ok());
}

#[test]
fn create_milestone_ids_are_unique() {
    let b = board(Vec::new());
    let (b, first) = b.create_milestone("backlog", "one", 10.0, NOW).unwrap();
    let (_, second) = b.create_milestone("backlog", "two", 10.0, NOW).unwrap();
    assert_ne!(first.id, second.id);
}

#[test]
fn create_milestone_rejects_full_or_unknown_column() {
    let b = board_with_full_review(5);
    assert_eq!(
        b.create_milestone("review", "x", 10.0, NOW).map(|(_, m)| m),
        Err(MoveRejection::WipLimitExceeded { column: Review, limit: 5 })
    );
    assert_eq!(
        b.create_milestone("icebox", "x", 10.0, NOW).map(|(_, m)| m),
        Err(MoveRejection::UnknownColumn("icebox".into()))
    );
}

#[test]
fn board_round_trip() {
    let b = board_with_full_review(5);
    let json = serde_json::to_string(&b).unwrap();
    let back: RoadmapBoard = serde_json::from_str(&json).unwrap();
    assert_eq!(back, b);
}
