//! Documents and their processing lifecycle.
//!
//! A document's status moves monotonically along
//! UPLOADING → PROCESSING → {COMPLETED | FAILED}; the terminal states
//! admit no further transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Processing lifecycle state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    /// Upload registered, bytes being received
    Uploading,

    /// Pipeline is deriving artifacts
    Processing,

    /// Pipeline finished; artifacts are available
    Completed,

    /// Pipeline aborted; no artifacts exist
    Failed,
}

impl ProcessingStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a transition to `next` respects the monotonic sequence.
    ///
    /// FAILED is reachable from any non-terminal state; COMPLETED only
    /// from PROCESSING.
    pub fn can_transition_to(self, next: ProcessingStatus) -> bool {
        match (self, next) {
            (Self::Uploading, Self::Processing) => true,
            (Self::Processing, Self::Completed) => true,
            (Self::Uploading | Self::Processing, Self::Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Uploading => "UPLOADING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        };
        write!(f, "{}", label)
    }
}

/// A registered document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: Uuid,

    /// Owning user identity
    pub owner: String,

    /// Filename as uploaded
    pub original_filename: String,

    /// Storage reference for the original bytes
    pub storage_path: String,

    /// Current lifecycle state
    pub processing_status: ProcessingStatus,

    /// When the upload was registered
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    /// Register a new document in UPLOADING state
    pub fn new(
        owner: impl Into<String>,
        original_filename: impl Into<String>,
        storage_path: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            original_filename: original_filename.into(),
            storage_path: storage_path.into(),
            processing_status: ProcessingStatus::Uploading,
            uploaded_at: Utc::now(),
        }
    }

    /// Whether the document is eligible for conversational queries
    pub fn is_queryable(&self) -> bool {
        self.processing_status == ProcessingStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        use ProcessingStatus::*;

        assert!(Uploading.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Uploading.can_transition_to(Failed));
        assert!(Processing.can_transition_to(Failed));
    }

    #[test]
    fn test_no_regression_or_terminal_escape() {
        use ProcessingStatus::*;

        assert!(!Processing.can_transition_to(Uploading));
        assert!(!Uploading.can_transition_to(Completed)); // cannot skip PROCESSING
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Failed.can_transition_to(Uploading));
    }

    #[test]
    fn test_terminal_states() {
        assert!(ProcessingStatus::Completed.is_terminal());
        assert!(ProcessingStatus::Failed.is_terminal());
        assert!(!ProcessingStatus::Uploading.is_terminal());
        assert!(!ProcessingStatus::Processing.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&ProcessingStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");

        let parsed: ProcessingStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(parsed, ProcessingStatus::Completed);
    }

    #[test]
    fn test_new_document_starts_uploading() {
        let doc = Document::new("user@example.com", "notes.pdf", "/data/uploads/abc.pdf");

        assert_eq!(doc.processing_status, ProcessingStatus::Uploading);
        assert_eq!(doc.original_filename, "notes.pdf");
        assert!(!doc.is_queryable());
    }
}
