//! Reducer and tracker property tests

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use webharvest::progress::{apply_stage_update, complete_all, derived_overall};
use webharvest::session::initial_stages;
use webharvest::{
    ExtractionResult, ProgressEvent, SessionStatus, SessionTracker, StageStatus, StageUpdate,
};

fn update(stage_index: usize, status: StageStatus, progress: f32) -> StageUpdate {
    StageUpdate {
        stage_index,
        status,
        progress,
        details: None,
        overall_progress: None,
    }
}

proptest! {
    /// For any sequence of updates with strictly increasing stage index,
    /// every stage before the last targeted one ends up completed/100.
    #[test]
    fn increasing_indices_complete_earlier_stages(
        progresses in proptest::collection::vec(0.0f32..=100.0, 1..=3)
    ) {
        let mut stages = initial_stages();
        let mut last_index = 0usize;
        for (index, progress) in progresses.iter().enumerate() {
            apply_stage_update(&mut stages, &update(index, StageStatus::InProgress, *progress));
            last_index = index;
        }

        for stage in &stages[..last_index] {
            prop_assert_eq!(stage.status, StageStatus::Completed);
            prop_assert_eq!(stage.progress, 100.0);
        }
        for stage in &stages[last_index + 1..] {
            prop_assert_eq!(stage.status, StageStatus::Pending);
        }
    }

    /// Progress values outside [0,100] never leak into the stage list.
    #[test]
    fn progress_always_clamped(
        index in 0usize..3,
        progress in -1000.0f32..=1000.0,
    ) {
        let mut stages = initial_stages();
        apply_stage_update(&mut stages, &update(index, StageStatus::InProgress, progress));
        for stage in &stages {
            prop_assert!((0.0..=100.0).contains(&stage.progress));
        }
    }

    /// Once a stage completes, no later update sequence can revert it.
    #[test]
    fn completion_is_monotonic(
        completed_index in 0usize..3,
        later in proptest::collection::vec((0usize..3, 0.0f32..=100.0), 0..8),
    ) {
        let mut stages = initial_stages();
        apply_stage_update(
            &mut stages,
            &update(completed_index, StageStatus::Completed, 100.0),
        );
        for (index, progress) in later {
            apply_stage_update(&mut stages, &update(index, StageStatus::InProgress, progress));
        }
        prop_assert_eq!(stages[completed_index].status, StageStatus::Completed);
        prop_assert_eq!(stages[completed_index].progress, 100.0);
    }

    /// `extraction_completed` forces the terminal display from any prior
    /// state.
    #[test]
    fn completed_event_forces_terminal_state(
        prior in proptest::collection::vec((0usize..3, 0.0f32..=100.0), 0..8),
    ) {
        let mut tracker = SessionTracker::new();
        for (index, progress) in prior {
            tracker.apply(&ProgressEvent::Stage(update(
                index,
                StageStatus::InProgress,
                progress,
            )));
        }
        tracker.apply(&ProgressEvent::Completed(ExtractionResult {
            format: "CSV".to_string(),
            size: None,
            records: 7,
            fields: None,
        }));

        prop_assert_eq!(tracker.status(), SessionStatus::Completed);
        prop_assert_eq!(tracker.overall_progress(), 100.0);
        for stage in tracker.stages() {
            prop_assert_eq!(stage.status, StageStatus::Completed);
            prop_assert_eq!(stage.progress, 100.0);
        }
    }
}

#[test]
fn spec_scenario_sequence() {
    // start -> stage 0 at 100 -> stage 1 at 50 -> stage 2 at 25 ->
    // completed {CSV, 2847}
    let mut tracker = SessionTracker::new();

    tracker.apply(&ProgressEvent::Stage(update(0, StageStatus::Completed, 100.0)));
    tracker.apply(&ProgressEvent::Stage(update(1, StageStatus::InProgress, 50.0)));
    tracker.apply(&ProgressEvent::Stage(update(2, StageStatus::InProgress, 25.0)));
    tracker.apply(&ProgressEvent::Completed(ExtractionResult {
        format: "CSV".to_string(),
        size: None,
        records: 2847,
        fields: None,
    }));

    for stage in tracker.stages() {
        assert_eq!(stage.status, StageStatus::Completed);
        assert_eq!(stage.progress, 100.0);
    }
    assert_eq!(tracker.overall_progress(), 100.0);
    assert_eq!(tracker.result().unwrap().records, 2847);
}

#[test]
fn skipped_stage_is_reconciled() {
    // Stage 1's updates were all dropped; the display still never shows
    // a pending stage before an active one
    let mut stages = initial_stages();
    apply_stage_update(&mut stages, &update(0, StageStatus::Completed, 100.0));
    apply_stage_update(&mut stages, &update(2, StageStatus::InProgress, 10.0));

    assert_eq!(stages[0].status, StageStatus::Completed);
    assert_eq!(stages[1].status, StageStatus::Completed);
    assert_eq!(stages[1].progress, 100.0);
    assert_eq!(stages[2].status, StageStatus::InProgress);
}

#[test]
fn derived_overall_tracks_thirds() {
    let mut stages = initial_stages();
    apply_stage_update(&mut stages, &update(0, StageStatus::Completed, 100.0));
    assert!((derived_overall(&stages) - 100.0 / 3.0).abs() < 0.01);

    complete_all(&mut stages);
    assert_eq!(derived_overall(&stages), 100.0);
}
