//! Conversation transcript entries.
//!
//! The transcript is an append-only ordered sequence; ordering is
//! issuance order, not response-arrival order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A citation attached to an assistant answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Document the passage came from
    pub document_id: Uuid,

    /// Page number within the document
    pub page: u32,

    /// Relevance score in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// One transcript entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier
    pub id: Uuid,

    pub role: Role,

    /// Message text
    pub content: String,

    /// Citations; empty for user messages and error replies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,

    /// When the message was appended
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A user turn, minted at append time
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// An assistant turn carrying an answer and its citations
    pub fn assistant(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            sources,
            timestamp: Utc::now(),
        }
    }
}
