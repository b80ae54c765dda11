//! Derived artifacts produced by the processing pipeline.
//!
//! Each completed document carries exactly one artifact per content type:
//! a free-text summary, a mind map forest, and an ordered flashcard deck.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::mindmap::MindMap;

/// Kinds of derived content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Summary,
    Mindmap,
    Flashcards,
}

impl ContentType {
    /// The canonical triple created for every completed document
    pub const ALL: [ContentType; 3] = [
        ContentType::Summary,
        ContentType::Mindmap,
        ContentType::Flashcards,
    ];
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Summary => "SUMMARY",
            Self::Mindmap => "MINDMAP",
            Self::Flashcards => "FLASHCARDS",
        };
        write!(f, "{}", label)
    }
}

/// A question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Payload of a derived artifact, keyed by content type.
///
/// Serializes as `{"content_type": ..., "content_data": {...}}` so the
/// persisted shape matches the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "content_type", content = "content_data")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentPayload {
    Summary { summary: String },
    Mindmap(MindMap),
    Flashcards { flashcards: Vec<Flashcard> },
}

impl ContentPayload {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Summary { .. } => ContentType::Summary,
            Self::Mindmap(_) => ContentType::Mindmap,
            Self::Flashcards { .. } => ContentType::Flashcards,
        }
    }
}

/// A derived artifact owned by a document.
///
/// Created once by the pipeline when the document completes, immutable
/// thereafter, and deleted only with its document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Unique identifier
    pub id: Uuid,

    /// Owning document
    pub document_id: Uuid,

    /// Owning user identity
    pub owner: String,

    /// Typed payload (`content_type` + `content_data` on the wire)
    #[serde(flatten)]
    pub payload: ContentPayload,

    /// When the artifact was created
    pub created_at: DateTime<Utc>,
}

impl GeneratedContent {
    pub fn new(document_id: Uuid, owner: impl Into<String>, payload: ContentPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            owner: owner.into(),
            payload,
            created_at: Utc::now(),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.payload.content_type()
    }
}
