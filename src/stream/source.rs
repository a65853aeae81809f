//! Injectable progress event sources
//!
//! The dashboard-facing side of the stream is a [`ProgressEventSource`]:
//! given a session id it yields a [`Subscription`] delivering
//! [`ProgressEvent`]s. The live implementation is
//! [`WebSocketSource`](crate::stream::subscriber::WebSocketSource); the
//! [`ScriptedSource`] here replays a deterministic event sequence over
//! tokio timers and backs both tests and the CLI's simulate mode.

use crate::error::{Result, StreamError};
use crate::session::types::{ExtractionResult, SessionId, StageStatus};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One item delivered by a subscription: a progress event, or a
/// stream-level failure
pub type StreamItem = std::result::Result<ProgressEvent, StreamError>;

/// A progress event for one session, already lifted off the wire
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Progress of one stage
    Stage(StageUpdate),
    /// Terminal: the extraction finished
    Completed(ExtractionResult),
    /// Terminal: the backend reported a failure
    Failed {
        /// Backend-reported error message
        message: String,
    },
}

impl ProgressEvent {
    /// Whether this event ends the session
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Completed(_) | ProgressEvent::Failed { .. }
        )
    }
}

/// A stage progress update
#[derive(Debug, Clone, PartialEq)]
pub struct StageUpdate {
    /// Zero-based index of the stage this update targets
    pub stage_index: usize,
    /// New status for the stage
    pub status: StageStatus,
    /// Stage-local progress in [0, 100]
    pub progress: f32,
    /// Human-readable detail line, if the backend sent one
    pub details: Option<String>,
    /// Overall progress in [0, 100] as computed by the backend
    pub overall_progress: Option<f32>,
}

impl StageUpdate {
    /// Convenience constructor for an in-progress update
    pub fn in_progress(stage_index: usize, progress: f32, details: impl Into<String>) -> Self {
        Self {
            stage_index,
            status: StageStatus::InProgress,
            progress,
            details: Some(details.into()),
            overall_progress: None,
        }
    }

    /// Convenience constructor for a completed-stage update
    pub fn completed(stage_index: usize, details: impl Into<String>) -> Self {
        Self {
            stage_index,
            status: StageStatus::Completed,
            progress: 100.0,
            details: Some(details.into()),
            overall_progress: None,
        }
    }
}

/// A source of progress events for extraction sessions
#[async_trait]
pub trait ProgressEventSource: Send + Sync {
    /// Open a subscription for the given session
    async fn subscribe(&self, session_id: &SessionId) -> Result<Subscription>;
}

/// An open progress subscription
///
/// Owns the background delivery task. Dropping the subscription cancels
/// the task; [`close`](Subscription::close) does the same eagerly and is
/// safe to call any number of times. After `close`, no further events are
/// observable even if some were already in flight.
pub struct Subscription {
    events: mpsc::Receiver<StreamItem>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    closed: bool,
}

impl Subscription {
    pub(crate) fn new(
        events: mpsc::Receiver<StreamItem>,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            events,
            cancel,
            task: Some(task),
            closed: false,
        }
    }

    /// Wait for the next event. Returns `None` once the stream has ended
    /// or the subscription was closed.
    pub async fn next_event(&mut self) -> Option<StreamItem> {
        if self.closed {
            return None;
        }
        self.events.recv().await
    }

    /// Tear the subscription down: cancel the delivery task (stopping any
    /// heartbeat timer and closing the underlying connection) and drop
    /// events still in flight. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.cancel.cancel();
        self.events.close();
        // Drain anything buffered before the close so it is never observed
        while self.events.try_recv().is_ok() {}
        debug!("progress subscription closed");
    }

    /// Whether [`close`](Subscription::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Wait for the background delivery task to finish (test helper;
    /// teardown itself does not require joining)
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// One step of a scripted event sequence
#[derive(Debug, Clone)]
pub struct ScriptedStep {
    /// Delay before the event fires
    pub delay: Duration,
    /// The event to deliver
    pub event: ProgressEvent,
}

impl ScriptedStep {
    /// Create a step firing after `delay`
    pub fn after(delay: Duration, event: ProgressEvent) -> Self {
        Self { delay, event }
    }
}

/// Deterministic event source replaying a fixed script
///
/// Every subscription replays the same sequence, honoring the per-step
/// delays on the tokio clock, so tests can drive it with paused time.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    script: Vec<ScriptedStep>,
}

impl ScriptedSource {
    /// Create a source replaying the given script
    pub fn new(script: Vec<ScriptedStep>) -> Self {
        Self { script }
    }

    /// The demo script: discovery of 15 pages, page-by-page extraction,
    /// four integration steps, then a completed CSV artifact
    pub fn demo() -> Self {
        let mut script = Vec::new();
        let step = |ms, event| ScriptedStep::after(Duration::from_millis(ms), event);

        script.push(step(
            200,
            ProgressEvent::Stage(StageUpdate::in_progress(0, 0.0, "Discovering pages...")),
        ));
        script.push(step(
            600,
            ProgressEvent::Stage(StageUpdate::completed(0, "Discovered 15 pages")),
        ));

        let total_pages = 15u32;
        for page in 1..=total_pages {
            let progress = (page as f32 / total_pages as f32) * 100.0;
            let update = if page == total_pages {
                StageUpdate::completed(1, format!("Extracted {page}/{total_pages} pages"))
            } else {
                StageUpdate::in_progress(
                    1,
                    progress,
                    format!("Extracted {page}/{total_pages} pages"),
                )
            };
            script.push(step(100, ProgressEvent::Stage(update)));
        }

        let integration_steps = [
            "Processing data...",
            "Formatting results...",
            "Generating file...",
            "Finalizing...",
        ];
        for (i, details) in integration_steps.iter().enumerate() {
            let progress = ((i + 1) as f32 / integration_steps.len() as f32) * 100.0;
            let update = if i + 1 == integration_steps.len() {
                StageUpdate::completed(2, *details)
            } else {
                StageUpdate::in_progress(2, progress, *details)
            };
            script.push(step(200, ProgressEvent::Stage(update)));
        }

        script.push(step(
            200,
            ProgressEvent::Completed(ExtractionResult {
                format: "CSV".to_string(),
                size: Some("1.2 MB".to_string()),
                records: 2847,
                fields: Some(12),
            }),
        ));

        Self::new(script)
    }
}

#[async_trait]
impl ProgressEventSource for ScriptedSource {
    async fn subscribe(&self, session_id: &SessionId) -> Result<Subscription> {
        let script = self.script.clone();
        let (tx, rx) = mpsc::channel(32);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let id = session_id.clone();

        let task = tokio::spawn(async move {
            debug!(session_id = %id, steps = script.len(), "scripted source started");
            for step in script {
                tokio::select! {
                    _ = task_cancel.cancelled() => return,
                    _ = tokio::time::sleep(step.delay) => {}
                }
                let terminal = step.event.is_terminal();
                if tx.send(Ok(step.event)).await.is_err() {
                    return;
                }
                if terminal {
                    return;
                }
            }
        });

        Ok(Subscription::new(rx, cancel, task))
    }
}
