//! Session initiator
//!
//! Issues the start request for an extraction job. Any failure here,
//! transport or non-success status, surfaces as
//! [`SessionError::StartFailed`] and the session never becomes active.

use crate::config::ClientConfig;
use crate::error::{Result, SessionError};
use crate::session::types::SessionId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    url: &'a str,
    requirements: &'a str,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    session_id: String,
}

/// Issues start requests against `POST /api/v1/extraction/start`
pub struct SessionInitiator {
    http: reqwest::Client,
    config: ClientConfig,
}

impl SessionInitiator {
    /// Create an initiator sharing the given HTTP client
    pub fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    /// Start an extraction job for `url` with free-text `requirements`.
    ///
    /// Both inputs must be non-empty after trimming.
    #[instrument(skip(self, requirements))]
    pub async fn start(&self, url: &str, requirements: &str) -> Result<SessionId> {
        if url.trim().is_empty() {
            return Err(SessionError::InvalidInput("url must not be empty".to_string()).into());
        }
        if requirements.trim().is_empty() {
            return Err(
                SessionError::InvalidInput("requirements must not be empty".to_string()).into(),
            );
        }

        let endpoint = self.config.start_endpoint()?;
        let request = StartRequest { url, requirements };

        let response = self
            .http
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SessionError::StartFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::StartFailed(format!(
                "backend returned {status}: {body}"
            ))
            .into());
        }

        let body: StartResponse = response
            .json()
            .await
            .map_err(|e| SessionError::StartFailed(format!("malformed start response: {e}")))?;

        let session_id = SessionId::new(body.session_id);
        debug!(session_id = %session_id, "extraction session started");
        Ok(session_id)
    }
}
