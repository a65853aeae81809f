//! High-level extraction client
//!
//! [`ExtractionClient`] ties the protocol together: start a session,
//! subscribe to its progress through an injectable
//! [`ProgressEventSource`], and retrieve the artifact once completed. The
//! client enforces the single-start contract: while a session is active,
//! further `start` calls are rejected until a terminal state or an
//! explicit [`reset`](ExtractionClient::reset).

use crate::config::ClientConfig;
use crate::error::{Error, Result, SessionError};
use crate::progress::SessionTracker;
use crate::session::{
    Artifact, PreviewTable, ResultRetriever, Session, SessionId, SessionInitiator, StatusReport,
};
use crate::stream::{ProgressEvent, ProgressEventSource, Subscription, WebSocketSource};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Single-start slot. `Starting` reserves the slot for the duration of
/// the start request so concurrent `start` calls cannot both pass the
/// guard.
enum ActiveSlot {
    Idle,
    Starting,
    Active(Session),
}

/// Client for one extraction backend
pub struct ExtractionClient {
    initiator: SessionInitiator,
    retriever: ResultRetriever,
    source: Arc<dyn ProgressEventSource>,
    active: Mutex<ActiveSlot>,
}

impl ExtractionClient {
    /// Client with the live WebSocket event source
    pub fn new(config: ClientConfig) -> Result<Self> {
        let source = Arc::new(WebSocketSource::new(config.clone()));
        Self::with_source(config, source)
    }

    /// Client with an injected event source (scripted sources for tests
    /// and demos)
    pub fn with_source(
        config: ClientConfig,
        source: Arc<dyn ProgressEventSource>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            initiator: SessionInitiator::new(http.clone(), config.clone()),
            retriever: ResultRetriever::new(http, config),
            source,
            active: Mutex::new(ActiveSlot::Idle),
        })
    }

    /// Start an extraction session.
    ///
    /// Rejected with [`SessionError::AlreadyStarted`] while another
    /// session started through this client is still active.
    #[instrument(skip(self, requirements))]
    pub async fn start(&self, url: &str, requirements: &str) -> Result<SessionId> {
        {
            let mut active = self.active.lock();
            if !matches!(*active, ActiveSlot::Idle) {
                return Err(SessionError::AlreadyStarted.into());
            }
            *active = ActiveSlot::Starting;
        }

        let session_id = match self.initiator.start(url, requirements).await {
            Ok(id) => id,
            Err(error) => {
                *self.active.lock() = ActiveSlot::Idle;
                return Err(error);
            }
        };
        *self.active.lock() =
            ActiveSlot::Active(Session::new(session_id.clone(), url, requirements));
        info!(session_id = %session_id, url, "extraction started");
        Ok(session_id)
    }

    /// Open a progress subscription for a session
    pub async fn subscribe(&self, session_id: &SessionId) -> Result<Subscription> {
        self.source.subscribe(session_id).await
    }

    /// Poll the status endpoint
    pub async fn status(&self, session_id: &SessionId) -> Result<StatusReport> {
        self.retriever.status(session_id).await
    }

    /// Fetch the first-rows preview
    pub async fn preview(&self, session_id: &SessionId) -> Result<PreviewTable> {
        self.retriever.preview(session_id).await
    }

    /// Download the artifact of a completed session
    pub async fn download(&self, session_id: &SessionId) -> Result<Artifact> {
        self.retriever.download(session_id).await
    }

    /// Session currently considered active, if any
    pub fn active_session(&self) -> Option<Session> {
        match &*self.active.lock() {
            ActiveSlot::Active(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Clear the active session so a new start is allowed
    pub fn reset(&self) {
        *self.active.lock() = ActiveSlot::Idle;
    }

    /// Subscribe and fold events until a terminal state.
    ///
    /// Returns the final tracker on completion. A backend-reported
    /// failure or a stream failure is returned as an error; in every
    /// terminal outcome the active-session guard is released so the
    /// caller may retry.
    #[instrument(skip(self))]
    pub async fn run_to_completion(&self, session_id: &SessionId) -> Result<SessionTracker> {
        let mut subscription = self.subscribe(session_id).await?;
        let mut tracker = SessionTracker::new();

        let outcome = loop {
            match subscription.next_event().await {
                Some(Ok(event)) => {
                    tracker.apply(&event);
                    match event {
                        ProgressEvent::Completed(_) => break Ok(tracker),
                        ProgressEvent::Failed { message } => {
                            break Err(Error::Session(SessionError::ExtractionFailed(message)))
                        }
                        ProgressEvent::Stage(_) => {}
                    }
                }
                Some(Err(stream_error)) => {
                    warn!(session_id = %session_id, error = %stream_error, "progress stream failed");
                    break Err(Error::Stream(stream_error));
                }
                None => {
                    // Stream ended without a terminal event
                    break Err(Error::generic("progress stream ended unexpectedly"));
                }
            }
        };

        subscription.close();
        self.release(session_id);
        outcome
    }

    fn release(&self, session_id: &SessionId) {
        let mut active = self.active.lock();
        if matches!(&*active, ActiveSlot::Active(s) if s.id == *session_id) {
            *active = ActiveSlot::Idle;
        }
    }
}
