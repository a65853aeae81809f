//! Stage state reduction
//!
//! Pure folds of progress events into the three-stage display model, and
//! the [`SessionTracker`] that owns the folded state for one session.

pub mod reducer;
pub mod tracker;

pub use reducer::{apply_stage_update, complete_all, derived_overall};
pub use tracker::SessionTracker;
