//! Client configuration
//!
//! This module holds the connection settings for the extraction backend:
//! the HTTP base URL, the derived WebSocket base URL, and the protocol
//! timers (handshake timeout, heartbeat interval).

use crate::error::{Error, Result};
use crate::session::SessionId;
use std::time::Duration;
use url::Url;

/// Default backend base URL for local development
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings for the extraction backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    /// Window in which the stream must deliver at least one message
    /// (default: 10s)
    handshake_timeout: Duration,
    /// Interval between liveness probes on an open stream (default: 30s)
    heartbeat_interval: Duration,
    /// Per-request timeout for plain HTTP calls (default: 30s)
    request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // DEFAULT_BASE_URL is a valid absolute URL
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
            handshake_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at the given backend base URL
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder().base_url(base_url)?.build()
    }

    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Backend base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Handshake confirmation window
    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }

    /// Liveness probe interval
    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// HTTP request timeout
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// `POST /api/v1/extraction/start`
    pub fn start_endpoint(&self) -> Result<Url> {
        self.join("api/v1/extraction/start")
    }

    /// `GET /api/v1/extraction/{session_id}/status`
    pub fn status_endpoint(&self, session_id: &SessionId) -> Result<Url> {
        self.join(&format!("api/v1/extraction/{session_id}/status"))
    }

    /// `GET /api/v1/extraction/{session_id}/preview`
    pub fn preview_endpoint(&self, session_id: &SessionId) -> Result<Url> {
        self.join(&format!("api/v1/extraction/{session_id}/preview"))
    }

    /// `GET /api/v1/extraction/{session_id}/download`
    pub fn download_endpoint(&self, session_id: &SessionId) -> Result<Url> {
        self.join(&format!("api/v1/extraction/{session_id}/download"))
    }

    /// WebSocket endpoint `/api/v1/ws/extraction/{session_id}`.
    ///
    /// The scheme follows the HTTP base URL: `https` becomes `wss`,
    /// everything else `ws`.
    pub fn stream_endpoint(&self, session_id: &SessionId) -> Result<Url> {
        let mut url = self.join(&format!("api/v1/ws/extraction/{session_id}"))?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| Error::config(format!("cannot derive ws scheme for {url}")))?;
        Ok(url)
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::config(format!("invalid endpoint path {path}: {e}")))
    }
}

/// Builder for [`ClientConfig`]
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the backend base URL
    pub fn base_url(mut self, base_url: &str) -> Result<Self> {
        let mut url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("invalid base URL {base_url}: {e}")))?;
        // Endpoint joins need a trailing slash to keep the full path
        if !url.path().ends_with('/') {
            url.set_path(&format!("{}/", url.path()));
        }
        self.config.base_url = url;
        Ok(self)
    }

    /// Set the handshake confirmation window
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Set the liveness probe interval
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    /// Set the HTTP request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the config
    pub fn build(self) -> Result<ClientConfig> {
        Ok(self.config)
    }
}
