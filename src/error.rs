//! Error types for the WebHarvest client
//!
//! This module provides the error hierarchy for all client operations,
//! using `thiserror`. Session-level failures (start, download, backend
//! errors) and stream-level failures (timeout, abnormal closure) are kept
//! in separate sub-enums so callers can match on the layer that failed.

use thiserror::Error;

/// The main error type for WebHarvest client operations
#[derive(Error, Debug)]
pub enum Error {
    /// Session lifecycle errors (start, download, backend failure)
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Progress stream errors (timeout, lost connection)
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Client configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Session lifecycle errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// The start request was rejected or never reached the backend.
    /// The session does not transition to active.
    #[error("Failed to start extraction: {0}")]
    StartFailed(String),

    /// A start was attempted while another session is still active
    #[error("An extraction session is already active")]
    AlreadyStarted,

    /// Start inputs were empty or otherwise unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backend reported a failure over the progress stream
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// Artifact retrieval failed; the session stays completed and the
    /// download may be retried
    #[error("Download failed (HTTP {status}): {message}")]
    DownloadFailed {
        /// HTTP status code returned by the backend
        status: u16,
        /// Error message
        message: String,
    },

    /// Status or preview request failed
    #[error("Status request failed: {0}")]
    StatusFailed(String),
}

/// Progress stream errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// No message (not even a probe acknowledgment) arrived within the
    /// handshake window; the connection was closed
    #[error("Connection not confirmed within {0}ms")]
    ConnectionTimeout(u64),

    /// The stream closed with an abnormal close code mid-session
    #[error("Connection lost (close code {0})")]
    ConnectionLost(u16),

    /// Transport-level failure on the stream
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Result type alias for WebHarvest client operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a configuration error from a string
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}
