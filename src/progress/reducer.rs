//! Pure stage-list reducer
//!
//! The backend emits stages in order without skips, so an update to stage
//! N implies every stage before N is done; the reducer reconciles dropped
//! intermediate events on that assumption. Completion is monotonic: a
//! stage that reached `Completed` never reverts, and an update targeting
//! an already-completed stage is ignored so duplicated or reordered
//! events cannot roll the display back.

use crate::session::types::{StageList, StageStatus};
use crate::stream::source::StageUpdate;
use tracing::warn;

/// Fold one stage update into the stage list.
///
/// Out-of-range indices are logged and ignored; progress values are
/// clamped to [0, 100].
pub fn apply_stage_update(stages: &mut StageList, update: &StageUpdate) {
    let index = update.stage_index;
    if index >= stages.len() {
        warn!(stage_index = index, "ignoring update for unknown stage");
        return;
    }

    // Stages before the target are implicitly done
    for earlier in &mut stages[..index] {
        if earlier.status != StageStatus::Completed {
            earlier.status = StageStatus::Completed;
            earlier.progress = 100.0;
        }
    }

    let stage = &mut stages[index];
    if stage.status == StageStatus::Completed {
        return;
    }

    stage.status = update.status;
    stage.progress = if update.status == StageStatus::Completed {
        100.0
    } else {
        clamp_progress(update.progress)
    };
    if let Some(details) = &update.details {
        stage.details = details.clone();
    }
}

/// Force every stage to completed/100 (terminal completion)
pub fn complete_all(stages: &mut StageList) {
    for stage in stages.iter_mut() {
        stage.status = StageStatus::Completed;
        stage.progress = 100.0;
    }
}

/// Overall progress derived from the stage list: each stage contributes
/// an equal share of the total
pub fn derived_overall(stages: &StageList) -> f32 {
    let sum: f32 = stages.iter().map(|s| clamp_progress(s.progress)).sum();
    sum / stages.len() as f32
}

pub(crate) fn clamp_progress(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}
