//! Extraction session model and HTTP operations
//!
//! A session is one extraction job identified by an opaque server-issued
//! id. This module holds the session data model, the start request
//! (session initiator), and artifact retrieval (result retriever).

pub mod initiator;
pub mod retriever;
pub mod types;

pub use initiator::SessionInitiator;
pub use retriever::{Artifact, PreviewTable, ResultRetriever, StatusReport};
pub use types::{
    initial_stages, ExtractionResult, Session, SessionId, SessionStatus, StageKind, StageList,
    StageState, StageStatus, STAGE_COUNT,
};
