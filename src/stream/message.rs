//! Wire messages for the extraction progress stream
//!
//! Messages are JSON objects tagged by a `type` discriminator. Types the
//! client does not recognize deserialize to [`ServerMessage::Unknown`] and
//! are ignored, so the backend can add message types without breaking
//! deployed clients.

use crate::session::types::{ExtractionResult, StageStatus};
use serde::{Deserialize, Serialize};

/// Messages sent by the client over the stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Liveness probe
    Ping,
}

/// Messages received from the backend over the stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Heartbeat acknowledgment; no state change
    Pong,
    /// Progress of one stage
    StageUpdate {
        /// Zero-based index of the stage this update targets
        stage_index: usize,
        /// Stage payload
        stage: StagePayload,
        /// Overall progress in [0, 100] as computed by the backend
        #[serde(default)]
        overall_progress: Option<f32>,
    },
    /// Terminal: the extraction finished and produced an artifact
    ExtractionCompleted {
        /// Artifact metadata
        result: ExtractionResult,
    },
    /// Terminal: the extraction failed
    ExtractionError {
        /// Backend-reported error message
        error: String,
    },
    /// Any message type this client does not know; ignored
    #[serde(other)]
    Unknown,
}

/// The per-stage payload of a `stage_update` message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagePayload {
    /// Stage status
    pub status: StageStatus,
    /// Stage-local progress in [0, 100]
    #[serde(default)]
    pub progress: f32,
    /// Human-readable detail line
    #[serde(default)]
    pub details: Option<String>,
}
