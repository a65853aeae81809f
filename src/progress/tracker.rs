//! Session progress tracker
//!
//! Owns the folded display state for one session: the stage list, the
//! overall progress bar value, and the terminal result or error. All
//! mutation goes through [`SessionTracker::apply`], one event at a time.

use crate::progress::reducer::{self, clamp_progress};
use crate::session::types::{
    initial_stages, ExtractionResult, SessionStatus, StageKind, StageList, StageStatus,
};
use crate::stream::source::ProgressEvent;
use tracing::debug;

/// Folded progress state for one extraction session
#[derive(Debug, Clone)]
pub struct SessionTracker {
    stages: StageList,
    overall: f32,
    status: SessionStatus,
    result: Option<ExtractionResult>,
    error: Option<String>,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    /// Tracker for a session that has produced no events yet
    pub fn new() -> Self {
        Self {
            stages: initial_stages(),
            overall: 0.0,
            status: SessionStatus::Created,
            result: None,
            error: None,
        }
    }

    /// Fold one event into the state. Events arriving after a terminal
    /// state are no-ops.
    pub fn apply(&mut self, event: &ProgressEvent) {
        if self.status.is_terminal() {
            debug!("ignoring event after terminal state");
            return;
        }

        match event {
            ProgressEvent::Stage(update) => {
                self.status = SessionStatus::Active;
                reducer::apply_stage_update(&mut self.stages, update);
                let overall = match update.overall_progress {
                    Some(value) => clamp_progress(value),
                    None => reducer::derived_overall(&self.stages),
                };
                // The bar never moves backwards
                if overall > self.overall {
                    self.overall = overall;
                }
            }
            ProgressEvent::Completed(result) => {
                reducer::complete_all(&mut self.stages);
                self.overall = 100.0;
                self.status = SessionStatus::Completed;
                self.result = Some(result.clone());
            }
            ProgressEvent::Failed { message } => {
                self.status = SessionStatus::Failed;
                self.error = Some(message.clone());
            }
        }
    }

    /// Current stage list
    pub fn stages(&self) -> &StageList {
        &self.stages
    }

    /// Overall progress in [0, 100]
    pub fn overall_progress(&self) -> f32 {
        self.overall
    }

    /// Session lifecycle state
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whether the session reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The artifact metadata, once completed
    pub fn result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref()
    }

    /// The backend-reported error, once failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The stage currently in progress, if any
    pub fn current_stage(&self) -> Option<StageKind> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::InProgress)
            .map(|s| s.kind)
    }
}
