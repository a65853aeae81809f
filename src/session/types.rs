//! Session and stage data model
//!
//! Stage records carry a [`StageKind`] instead of any presentation
//! concern; callers map kind to whatever label or icon they render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of stages in an extraction job
pub const STAGE_COUNT: usize = 3;

/// Opaque server-issued session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw identifier string
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Start request accepted, stream not yet confirmed
    Created,
    /// Progress events are flowing
    Active,
    /// Terminal: the backend signaled completion
    Completed,
    /// Terminal: the backend signaled an error
    Failed,
}

impl SessionStatus {
    /// Whether this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "created",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

/// One extraction job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Server-issued identifier
    pub id: SessionId,
    /// Source URL being extracted
    pub url: String,
    /// Free-text extraction requirements
    pub requirements: String,
    /// Lifecycle state
    pub status: SessionStatus,
    /// When the start request succeeded
    pub created_at: DateTime<Utc>,
    /// Populated once the backend signals completion; immutable afterwards
    pub result: Option<ExtractionResult>,
}

impl Session {
    /// Create a freshly started session
    pub fn new(id: SessionId, url: impl Into<String>, requirements: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            requirements: requirements.into(),
            status: SessionStatus::Created,
            created_at: Utc::now(),
            result: None,
        }
    }
}

/// The three ordered phases of an extraction job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Discovering and mapping website structure
    Discovery,
    /// Extracting relevant data based on requirements
    Extraction,
    /// Processing and formatting extracted data
    Integration,
}

impl StageKind {
    /// All stages in protocol order
    pub const ALL: [StageKind; STAGE_COUNT] = [
        StageKind::Discovery,
        StageKind::Extraction,
        StageKind::Integration,
    ];

    /// Zero-based position in the protocol order
    pub fn index(&self) -> usize {
        match self {
            StageKind::Discovery => 0,
            StageKind::Extraction => 1,
            StageKind::Integration => 2,
        }
    }

    /// Stage kind at the given protocol index
    pub fn from_index(index: usize) -> Option<StageKind> {
        Self::ALL.get(index).copied()
    }

    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            StageKind::Discovery => "Page Discovery",
            StageKind::Extraction => "Content Extraction",
            StageKind::Integration => "Result Integration",
        }
    }

    /// One-line description
    pub fn description(&self) -> &'static str {
        match self {
            StageKind::Discovery => "Discovering and mapping website structure",
            StageKind::Extraction => "Extracting relevant data based on requirements",
            StageKind::Integration => "Processing and formatting extracted data",
        }
    }
}

/// Progress state of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    /// Not yet started
    Pending,
    /// Currently running
    InProgress,
    /// Finished; never reverts within a session
    Completed,
}

/// Display state of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageState {
    /// Which stage this is
    pub kind: StageKind,
    /// Current status
    pub status: StageStatus,
    /// Local progress in [0, 100]
    pub progress: f32,
    /// Human-readable detail line
    pub details: String,
}

impl StageState {
    fn pending(kind: StageKind) -> Self {
        Self {
            kind,
            status: StageStatus::Pending,
            progress: 0.0,
            details: "Waiting to start...".to_string(),
        }
    }
}

/// Fixed ordered list of the three stage states
pub type StageList = [StageState; STAGE_COUNT];

/// Stage list for a session that has not produced any events yet
pub fn initial_stages() -> StageList {
    StageKind::ALL.map(StageState::pending)
}

/// Metadata of the produced artifact; set once on completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Output format, e.g. "CSV"
    pub format: String,
    /// Human-readable size, e.g. "1.2 MB"
    #[serde(default)]
    pub size: Option<String>,
    /// Number of extracted records
    pub records: u64,
    /// Number of fields per record
    #[serde(default)]
    pub fields: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new("sess_42");
        assert_eq!(id.to_string(), "sess_42");
        assert_eq!(id.as_str(), "sess_42");
    }

    #[test]
    fn test_stage_kind_order() {
        assert_eq!(StageKind::Discovery.index(), 0);
        assert_eq!(StageKind::from_index(2), Some(StageKind::Integration));
        assert_eq!(StageKind::from_index(3), None);
    }

    #[test]
    fn test_initial_stages() {
        let stages = initial_stages();
        assert_eq!(stages.len(), STAGE_COUNT);
        for (i, stage) in stages.iter().enumerate() {
            assert_eq!(stage.kind.index(), i);
            assert_eq!(stage.status, StageStatus::Pending);
            assert_eq!(stage.progress, 0.0);
        }
    }

    #[test]
    fn test_stage_status_wire_format() {
        let json = serde_json::to_string(&StageStatus::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);
        let status: StageStatus = serde_json::from_str(r#""completed""#).unwrap();
        assert_eq!(status, StageStatus::Completed);
    }

    #[test]
    fn test_session_lifecycle_flags() {
        assert!(!SessionStatus::Active.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
    }

    #[test]
    fn test_extraction_result_lenient_deserialize() {
        let result: ExtractionResult =
            serde_json::from_str(r#"{"format":"CSV","records":2847}"#).unwrap();
        assert_eq!(result.format, "CSV");
        assert_eq!(result.records, 2847);
        assert_eq!(result.size, None);
        assert_eq!(result.fields, None);
    }
}
