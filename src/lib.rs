//! WebHarvest Client - Extraction Session Protocol Client
//!
//! This crate provides an async client for the WebHarvest extraction
//! backend: session management, WebSocket progress streaming, stage state
//! reduction, and artifact download.
//!
//! # Features
//!
//! - **Session Initiator**: start an extraction job over HTTP and obtain
//!   a session id
//! - **Progress Stream**: subscribe to stage-update events over WebSocket
//!   with handshake timeout, heartbeat, and deterministic teardown
//! - **Stage Reduction**: fold events into the three-stage progress model
//!   (discovery, extraction, integration)
//! - **Result Retrieval**: download the produced artifact, poll status,
//!   fetch a data preview
//!
//! # Architecture
//!
//! ```text
//! ExtractionClient ──▶ SessionInitiator ──▶ POST /extraction/start
//!        │
//!        ├──▶ ProgressEventSource ──▶ WS /ws/extraction/{id}
//!        │           │                    (or ScriptedSource)
//!        │           ▼
//!        │    SessionTracker ◀── stage_update / completed / error
//!        │
//!        └──▶ ResultRetriever ──▶ GET /extraction/{id}/download
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use webharvest::{ClientConfig, ExtractionClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("http://localhost:8000")?;
//!     let client = ExtractionClient::new(config)?;
//!
//!     let session = client
//!         .start("https://shop.example.com", "extract product titles and prices")
//!         .await?;
//!     let tracker = client.run_to_completion(&session).await?;
//!
//!     let artifact = client.download(&session).await?;
//!     println!(
//!         "{} records -> {}",
//!         tracker.result().map(|r| r.records).unwrap_or(0),
//!         artifact.filename
//!     );
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod progress;
pub mod session;
pub mod stream;

// Re-exports for convenience
pub use client::ExtractionClient;
pub use config::ClientConfig;
pub use error::{Error, Result, SessionError, StreamError};
pub use progress::SessionTracker;
pub use session::{
    Artifact, ExtractionResult, Session, SessionId, SessionStatus, StageKind, StageState,
    StageStatus,
};
pub use stream::{ProgressEvent, ProgressEventSource, ScriptedSource, StageUpdate, Subscription};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
