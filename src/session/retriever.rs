//! Result retriever
//!
//! Fetches what a session produced: the downloadable artifact, the
//! polling status fallback, and the first-rows preview. A failed download
//! leaves the session untouched, so retrying is always safe.

use crate::config::ClientConfig;
use crate::error::{Result, SessionError};
use crate::session::types::{SessionId, SessionStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A downloaded artifact with its derived filename
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Derived filename, `extraction_<session_id>.csv`
    pub filename: String,
    /// Raw artifact bytes
    pub bytes: Vec<u8>,
    /// Content type reported by the backend, if any
    pub content_type: Option<String>,
}

/// Snapshot from the polling status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    /// Session this report describes
    pub session_id: SessionId,
    /// Lifecycle state
    pub status: SessionStatus,
    /// Index of the stage currently running, if any
    #[serde(default)]
    pub stage_index: Option<usize>,
    /// Overall progress in [0, 100]
    #[serde(default)]
    pub overall_progress: Option<f32>,
}

/// First rows of the produced table, for display before download
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewTable {
    /// Column names
    #[serde(default)]
    pub columns: Vec<String>,
    /// Row values, one vector per row
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Retrieves session results over HTTP
pub struct ResultRetriever {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ResultRetriever {
    /// Create a retriever sharing the given HTTP client
    pub fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    /// Download the artifact for a completed session.
    ///
    /// Fails with [`SessionError::DownloadFailed`] on a non-success
    /// response; session state is not affected and the call may be
    /// retried.
    #[instrument(skip(self))]
    pub async fn download(&self, session_id: &SessionId) -> Result<Artifact> {
        let endpoint = self.config.download_endpoint(session_id)?;

        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| SessionError::DownloadFailed {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SessionError::DownloadFailed {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SessionError::DownloadFailed {
                status: status.as_u16(),
                message: e.to_string(),
            })?
            .to_vec();

        let filename = artifact_filename(session_id);
        debug!(session_id = %session_id, size = bytes.len(), %filename, "artifact downloaded");

        Ok(Artifact {
            filename,
            bytes,
            content_type,
        })
    }

    /// Poll the status endpoint (fallback for when the stream is
    /// unavailable)
    #[instrument(skip(self))]
    pub async fn status(&self, session_id: &SessionId) -> Result<StatusReport> {
        let endpoint = self.config.status_endpoint(session_id)?;
        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| SessionError::StatusFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::StatusFailed(format!(
                "backend returned {}",
                response.status()
            ))
            .into());
        }

        let report = response
            .json()
            .await
            .map_err(|e| SessionError::StatusFailed(format!("malformed status response: {e}")))?;
        Ok(report)
    }

    /// Fetch the first-rows preview of the produced table
    #[instrument(skip(self))]
    pub async fn preview(&self, session_id: &SessionId) -> Result<PreviewTable> {
        let endpoint = self.config.preview_endpoint(session_id)?;
        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| SessionError::StatusFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::StatusFailed(format!(
                "backend returned {}",
                response.status()
            ))
            .into());
        }

        let preview = response
            .json()
            .await
            .map_err(|e| SessionError::StatusFailed(format!("malformed preview response: {e}")))?;
        Ok(preview)
    }
}

/// Filename derived from the session id
pub fn artifact_filename(session_id: &SessionId) -> String {
    format!("extraction_{session_id}.csv")
}
