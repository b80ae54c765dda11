//! Artifact store: the single source of truth for documents and their
//! derived content.
//!
//! The store is an injected repository seam rather than ambient global
//! state, so the simulator, poller-driven readers, and the query engine
//! all share one substitutable abstraction.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Document, GeneratedContent, ProcessingStatus};

pub mod json;

pub use json::JsonStore;

/// Errors raised by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(Uuid),

    #[error("Document {document} does not belong to {owner}")]
    Forbidden { document: Uuid, owner: String },

    #[error("Document already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Invalid status transition: {from} → {to}")]
    InvalidTransition {
        from: ProcessingStatus,
        to: ProcessingStatus,
    },

    #[error("Generated content for document {0} must be exactly one artifact per content type")]
    IncompleteContentSet(Uuid),

    #[error("Generated content already exists for document {0}")]
    ContentExists(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence contract shared by the pipeline (writer) and all readers.
///
/// Readers get "latest committed record" semantics only; a document may be
/// observed mid-transition, but COMPLETED is never visible with fewer than
/// three artifacts (see [`DocumentStore::complete_document`]).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a newly registered document
    async fn insert_document(&self, document: Document) -> Result<(), StoreError>;

    /// Fetch one document, enforcing ownership
    async fn get_document(&self, owner: &str, id: Uuid) -> Result<Document, StoreError>;

    /// All documents for an owner, newest first
    async fn list_documents(&self, owner: &str) -> Result<Vec<Document>, StoreError>;

    /// Advance a document's status along the monotonic sequence.
    ///
    /// COMPLETED is rejected as a target here; completion goes through
    /// [`DocumentStore::complete_document`] so the artifact triple is
    /// created in the same step.
    async fn update_status(
        &self,
        id: Uuid,
        next: ProcessingStatus,
    ) -> Result<Document, StoreError>;

    /// Atomically transition PROCESSING → COMPLETED and deposit exactly
    /// one artifact per content type.
    async fn complete_document(
        &self,
        id: Uuid,
        contents: Vec<GeneratedContent>,
    ) -> Result<Document, StoreError>;

    /// Artifacts for a document; empty until the document completes
    async fn generated_for(
        &self,
        owner: &str,
        document_id: Uuid,
    ) -> Result<Vec<GeneratedContent>, StoreError>;

    /// Delete a document and cascade to its artifacts
    async fn delete_document(&self, owner: &str, id: Uuid) -> Result<(), StoreError>;
}
